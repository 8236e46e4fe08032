use sqlx::PgPool;

use crate::alerts::AlertType;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct NotificationSettings {
    pub user_id: String,
    pub email_notifications_enabled: bool,
    pub notification_email: Option<String>,
    pub bill_alerts_enabled: bool,
    pub employee_alerts_enabled: bool,
    pub expense_alerts_enabled: bool,
    pub achievement_alerts_enabled: bool,
    pub tax_alerts_enabled: bool,
    pub asset_alerts_enabled: bool,
    pub investment_alerts_enabled: bool,
}

impl NotificationSettings {
    /// Whether email is enabled for the given alert type.
    pub fn type_enabled(&self, alert_type: AlertType) -> bool {
        match alert_type {
            AlertType::Bill => self.bill_alerts_enabled,
            AlertType::Employee => self.employee_alerts_enabled,
            AlertType::Expense => self.expense_alerts_enabled,
            AlertType::Achievement => self.achievement_alerts_enabled,
            AlertType::Tax => self.tax_alerts_enabled,
            AlertType::Asset => self.asset_alerts_enabled,
            AlertType::Investment => self.investment_alerts_enabled,
        }
    }
}

pub async fn find(
    pool: &PgPool,
    user_id: &str,
) -> Result<Option<NotificationSettings>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM alert_notification_settings WHERE user_id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await
}
