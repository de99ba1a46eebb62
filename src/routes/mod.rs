pub mod auth;

pub mod users;

pub mod dictionaries;

pub mod groups;

pub mod disciplines;

pub mod fos;

pub mod documents;

pub mod reports;

pub mod messages;

pub mod frontend;

pub use auth::configure_auth_routes;
pub use dictionaries::configure_dictionary_routes;
pub use disciplines::configure_discipline_routes;
pub use documents::configure_document_routes;
pub use fos::configure_fos_routes;
pub use frontend::configure_frontend_routes;
pub use groups::configure_group_routes;
pub use messages::configure_message_routes;
pub use reports::configure_report_routes;
pub use users::configure_user_routes;
