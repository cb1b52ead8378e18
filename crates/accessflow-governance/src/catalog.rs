//! The access catalog.
//!
//! A compiled-in, read-only table of every grantable item, grouped into the
//! five [`Category`] values. Item names are kebab-case slugs; labels are
//! what people see in forms and notifications.

use serde::Serialize;

use crate::types::Category;

/// One grantable unit of access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CatalogItem {
    pub name: &'static str,
    pub label: &'static str,
}

const fn item(name: &'static str, label: &'static str) -> CatalogItem {
    CatalogItem { name, label }
}

static MAIN_CLOUD: &[CatalogItem] = &[
    item("core-payment", "Core Payment"),
    item("ai-labs", "AI Labs"),
    item("vortex", "Vortex"),
    item("hubtel", "Hubtel"),
    item("hubtel-developers", "Hubtel Developers"),
];

static GOV_CLOUD: &[CatalogItem] = &[
    item("logging", "Logging"),
    item("backup", "Backup"),
    item("network", "Network"),
    item("production", "Production"),
];

static LOG_SEARCH: &[CatalogItem] = &[
    item("hubtel-merchants", "Hubtel Merchants"),
    item("payments", "Payments"),
    item("instant-services", "Instant Services"),
    item("mobile", "Mobile"),
    item("messaging-and-ussd", "Messaging and USSD"),
    item("hubtel-qc", "Hubtel QC"),
    item("hubtel-portals", "Hubtel Portals"),
    item("hubtel-retailer", "Hubtel Retailer"),
    item("hubtel-customer-and-merchants", "Hubtel Customer and Merchants"),
    item("fraud-payment", "Fraud Payment"),
    item("infosec", "InfoSec"),
];

static SEARCH_INDEX: &[CatalogItem] = &[
    item("messaging-es", "Messaging ES"),
    item("send-money-es", "Send Money ES"),
    item("receive-money-es", "Receive Money ES"),
    item("ecommerce-search-es", "Ecommerce Search ES"),
    item("elastic-search-stream-es", "Elastic Search Stream ES"),
    item("graylog-es", "Graylog ES"),
    item("health-os", "Health OS"),
    item("hubtel-paylinks-es", "Hubtel Paylinks ES"),
    item("instant-services-es", "Instant Services ES"),
    item("internal-audit-os", "Internal Audit OS"),
    item("lend-score-os", "Lend Score OS"),
    item("marketing-portal-es", "Marketing Portal ES"),
    item("risk-profile-os", "Risk Profile OS"),
    item("ml-es", "ML ES"),
];

static OTHER: &[CatalogItem] = &[
    item("metabase", "Metabase"),
    item("nita-db-server", "NITA DB Server"),
    item("nita-web-server", "NITA WEB Server"),
    item("new-relic", "New Relic"),
    item("azure-devops", "Azure DevOps"),
    item("cloudflare", "Cloudflare"),
    item("windows-jumpbox", "Windows JumpBox"),
    item("kannel", "Kannel"),
    item("business-center", "Business Center"),
    item("spacelift", "Spacelift"),
    item("ghipss-server", "Ghipss Server"),
    item("icc", "ICC"),
    item("webmin", "Webmin"),
];

/// All categories, in display order.
pub fn categories() -> &'static [Category] {
    &Category::ALL
}

/// Items of a category, in display order.
pub fn items(category: Category) -> &'static [CatalogItem] {
    match category {
        Category::MainCloud => MAIN_CLOUD,
        Category::GovCloud => GOV_CLOUD,
        Category::LogSearch => LOG_SEARCH,
        Category::SearchIndex => SEARCH_INDEX,
        Category::Other => OTHER,
    }
}

/// Whether `name` is a catalog item of `category`.
pub fn contains(category: Category, name: &str) -> bool {
    items(category).iter().any(|i| i.name == name)
}

/// Display label of an item within a category.
pub fn label(category: Category, name: &str) -> Option<&'static str> {
    items(category)
        .iter()
        .find(|i| i.name == name)
        .map(|i| i.label)
}

/// Display label of an item in whichever category holds it.
///
/// Falls back to the raw name for anything outside the catalog.
pub fn display_label(name: &str) -> &str {
    categories()
        .iter()
        .find_map(|c| label(*c, name))
        .unwrap_or(name)
}
