//! HTTP handlers
//!
//! Axum request handlers for the API endpoints.

pub mod anlage_v;
pub mod categorization;
pub mod communication;
pub mod documentation;
pub mod webhooks;
pub mod workflows;

pub use anlage_v::{advance_wizard, run_wizard, save_submission};
pub use categorization::{
    apply_rules, categorize_transaction, create_rule, delete_rule, list_rules, preview_rule,
    update_rule,
};
pub use communication::{send_letter, send_whatsapp};
pub use documentation::{
    generate_roadmap_documentation, generate_testing_documentation,
    generate_timeline_documentation, get_documentation,
};
pub use webhooks::{whatsapp_verify, whatsapp_webhook};
pub use workflows::{
    activate_version, archive_version, create_version, get_active_version, list_versions,
};
