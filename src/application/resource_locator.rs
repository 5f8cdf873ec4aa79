// Maps (domain, period, resource kind) to snapshot URLs
use std::collections::HashMap;

use crate::domain::period::{Period, PeriodClass};
use crate::domain::resource::{ResourceKind, ResourceScope};
use crate::infrastructure::config::{prepare_template, StoreSettings};

#[derive(Debug, Clone)]
pub struct ResourceLocator {
    base_url: String,
    domain: String,
    live_template: String,
    archive_template: String,
    profile_template: String,
}

impl ResourceLocator {
    pub fn new(store: &StoreSettings, domain: &str) -> Self {
        Self {
            base_url: store.base_url.trim_end_matches('/').to_string(),
            domain: urlencoding::encode(domain).into_owned(),
            live_template: store.live_template.clone(),
            archive_template: store.archive_template.clone(),
            profile_template: store.profile_template.clone(),
        }
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// URL of `kind` for `period`. Pure: no I/O, same inputs give the same URL.
    pub fn resolve(&self, kind: ResourceKind, class: PeriodClass, period: Period) -> String {
        match (kind.scope(), class) {
            (ResourceScope::Profile, _) => self.profile_url(kind),
            (ResourceScope::Periodic, PeriodClass::Current) => self.live_url(kind),
            (ResourceScope::Periodic, PeriodClass::Past) => self.archive_url(kind, period),
        }
    }

    /// URL with a fixed identity, independent of any period. Used for freshness probes.
    pub fn fixed_url(&self, kind: ResourceKind) -> String {
        match kind.scope() {
            ResourceScope::Profile => self.profile_url(kind),
            ResourceScope::Periodic => self.live_url(kind),
        }
    }

    fn live_url(&self, kind: ResourceKind) -> String {
        let vars = self.vars(kind.live_file());
        prepare_template(&self.live_template, &vars)
    }

    fn profile_url(&self, kind: ResourceKind) -> String {
        let vars = self.vars(kind.live_file());
        prepare_template(&self.profile_template, &vars)
    }

    fn archive_url(&self, kind: ResourceKind, period: Period) -> String {
        let mut vars = self.vars(kind.archive_file());
        vars.insert("year".to_string(), period.year_token());
        vars.insert("month".to_string(), period.month_token());
        prepare_template(&self.archive_template, &vars)
    }

    fn vars(&self, file: &str) -> HashMap<String, String> {
        let mut vars = HashMap::new();
        vars.insert("base".to_string(), self.base_url.clone());
        vars.insert("domain".to_string(), self.domain.clone());
        vars.insert("file".to_string(), file.to_string());
        vars
    }
}
