//! Database access layer

pub mod alerts;
pub mod bills;
pub mod employees;
pub mod invites;
pub mod notification_settings;
pub mod phone_verifications;
pub mod profiles;
pub mod stripe_customers;
pub mod stripe_orders;
pub mod stripe_subscriptions;
