//! Alert rule evaluator
//!
//! Pure functions mapping a snapshot of a user's bills and employees (plus an
//! injected "today") to a prioritized list of alerts. No clock reads, no
//! randomness: the same inputs always produce the same ordered list. Alert ids
//! are deterministic (`bill-{id}`, `vacation-{id}`, `vacation-overdue-{id}`,
//! `fgts-{id}`, `tax-irpf-{year}`), so one evaluation pass can never emit two
//! alerts for the same underlying fact.

mod money;

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::db::bills::Bill;
use crate::db::employees::Employee;

pub use money::format_brl;

/// Bills due within this many days (inclusive) produce an alert.
const BILL_DUE_WINDOW_DAYS: i64 = 7;
/// Upcoming vacations are surfaced up to this many days ahead.
const VACATION_WINDOW_DAYS: i64 = 30;
/// FGTS is due on the 7th of every month.
const FGTS_DUE_DAY: u32 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertType {
    Bill,
    Employee,
    Expense,
    Achievement,
    Tax,
    Asset,
    Investment,
}

impl AlertType {
    pub fn as_str(self) -> &'static str {
        match self {
            AlertType::Bill => "bill",
            AlertType::Employee => "employee",
            AlertType::Expense => "expense",
            AlertType::Achievement => "achievement",
            AlertType::Tax => "tax",
            AlertType::Asset => "asset",
            AlertType::Investment => "investment",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "bill" => Some(AlertType::Bill),
            "employee" => Some(AlertType::Employee),
            "expense" => Some(AlertType::Expense),
            "achievement" => Some(AlertType::Achievement),
            "tax" => Some(AlertType::Tax),
            "asset" => Some(AlertType::Asset),
            "investment" => Some(AlertType::Investment),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    /// Sort rank: high sorts first.
    pub fn rank(self) -> u8 {
        match self {
            Priority::High => 0,
            Priority::Medium => 1,
            Priority::Low => 2,
        }
    }
}

/// Transient, rule-derived notification surfaced to the user.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub id: String,
    #[serde(rename = "type")]
    pub alert_type: AlertType,
    pub title: String,
    pub description: String,
    pub date: NaiveDate,
    pub priority: Priority,
    pub is_read: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related_entity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_label: Option<String>,
}

/// Evaluate every rule against the snapshot and return the sorted alert list.
pub fn evaluate(today: NaiveDate, bills: &[Bill], employees: &[Employee]) -> Vec<Alert> {
    let mut alerts = Vec::new();

    bill_due_soon(today, bills, &mut alerts);
    vacation_alerts(today, employees, &mut alerts);
    fgts_monthly(today, employees, &mut alerts);
    annual_tax_filing(today, &mut alerts);

    // Stable: equal (priority, date) keeps rule emission order
    alerts.sort_by_key(|a| (a.priority.rank(), a.date));
    alerts
}

/// Rule 1: active bills due within the next 7 days (inclusive of today).
fn bill_due_soon(today: NaiveDate, bills: &[Bill], alerts: &mut Vec<Alert>) {
    for bill in bills.iter().filter(|b| b.is_active) {
        let days_until = (bill.next_due - today).num_days();
        if !(0..=BILL_DUE_WINDOW_DAYS).contains(&days_until) {
            continue;
        }

        let priority = if days_until <= 2 {
            Priority::High
        } else if days_until <= 5 {
            Priority::Medium
        } else {
            Priority::Low
        };

        let due_phrase = match days_until {
            0 => "Vence hoje".to_string(),
            1 => "Vence em 1 dia".to_string(),
            n => format!("Vence em {n} dias"),
        };

        alerts.push(Alert {
            id: format!("bill-{}", bill.id),
            alert_type: AlertType::Bill,
            title: format!("Conta a pagar: {}", bill.name),
            description: format!("{due_phrase} - {}", format_brl(bill.amount)),
            date: bill.next_due,
            priority,
            is_read: false,
            related_id: Some(bill.id.clone()),
            related_entity: Some("bill".to_string()),
            action_path: Some("/bills".to_string()),
            action_label: Some("Ver contas".to_string()),
        });
    }
}

/// Rules 2 and 3: upcoming and overdue vacations.
///
/// The two rules are mutually exclusive for a given employee: overdue covers
/// `days_until <= 0`, upcoming covers `0 < days_until <= 30`.
fn vacation_alerts(today: NaiveDate, employees: &[Employee], alerts: &mut Vec<Alert>) {
    for employee in employees {
        let Some(next_vacation) = employee.next_vacation else {
            continue;
        };
        let days_until = (next_vacation - today).num_days();

        if days_until <= 0 {
            alerts.push(Alert {
                id: format!("vacation-overdue-{}", employee.id),
                alert_type: AlertType::Employee,
                title: format!("Férias vencidas: {}", employee.name),
                description: "O período de férias já deveria ter sido concedido".to_string(),
                date: next_vacation,
                priority: Priority::High,
                is_read: false,
                related_id: Some(employee.id.clone()),
                related_entity: Some("employee".to_string()),
                action_path: Some("/employees".to_string()),
                action_label: Some("Ver funcionários".to_string()),
            });
        } else if days_until <= VACATION_WINDOW_DAYS {
            let priority = if days_until <= 7 {
                Priority::High
            } else {
                Priority::Medium
            };
            let days_phrase = if days_until == 1 {
                "1 dia".to_string()
            } else {
                format!("{days_until} dias")
            };

            alerts.push(Alert {
                id: format!("vacation-{}", employee.id),
                alert_type: AlertType::Employee,
                title: format!("Férias de {}", employee.name),
                description: format!("Férias programadas em {days_phrase}"),
                date: next_vacation,
                priority,
                is_read: false,
                related_id: Some(employee.id.clone()),
                related_entity: Some("employee".to_string()),
                action_path: Some("/employees".to_string()),
                action_label: Some("Ver funcionários".to_string()),
            });
        }
    }
}

/// Rule 4: FGTS guide for every active employee while the month's due window
/// is open (day of month <= 7). Independent of vacation fields.
fn fgts_monthly(today: NaiveDate, employees: &[Employee], alerts: &mut Vec<Alert>) {
    if today.day() > FGTS_DUE_DAY {
        return;
    }

    let due_date = NaiveDate::from_ymd_opt(today.year(), today.month(), FGTS_DUE_DAY)
        .expect("day 7 exists in every month");
    let days_left = FGTS_DUE_DAY - today.day();
    let priority = if days_left <= 2 {
        Priority::High
    } else {
        Priority::Medium
    };

    for employee in employees.iter().filter(|e| e.is_active()) {
        let amount = employee.salary * employee.fgts_percentage / Decimal::from(100);

        alerts.push(Alert {
            id: format!("fgts-{}", employee.id),
            alert_type: AlertType::Tax,
            title: format!("FGTS - {}", employee.name),
            description: format!(
                "Recolhimento de {} até o dia {FGTS_DUE_DAY}",
                format_brl(amount)
            ),
            date: due_date,
            priority,
            is_read: false,
            related_id: Some(employee.id.clone()),
            related_entity: Some("employee".to_string()),
            action_path: Some("/employees".to_string()),
            action_label: Some("Ver funcionários".to_string()),
        });
    }
}

/// Rule 5: annual income-tax filing (IRPF), at most one alert per year,
/// surfaced only in March/April when 30 or fewer days remain to April 30.
fn annual_tax_filing(today: NaiveDate, alerts: &mut Vec<Alert>) {
    if today.month() != 3 && today.month() != 4 {
        return;
    }

    let deadline =
        NaiveDate::from_ymd_opt(today.year(), 4, 30).expect("April 30 exists in every year");
    let days_remaining = (deadline - today).num_days();
    if !(0..=30).contains(&days_remaining) {
        return;
    }

    let priority = if days_remaining <= 7 {
        Priority::High
    } else {
        Priority::Medium
    };
    let description = match days_remaining {
        0 => "Último dia para entregar a declaração".to_string(),
        1 => "Falta 1 dia para o fim do prazo (30 de abril)".to_string(),
        n => format!("Faltam {n} dias para o fim do prazo (30 de abril)"),
    };

    alerts.push(Alert {
        id: format!("tax-irpf-{}", today.year()),
        alert_type: AlertType::Tax,
        title: "Declaração do Imposto de Renda".to_string(),
        description,
        date: deadline,
        priority,
        is_read: false,
        related_id: None,
        related_entity: None,
        action_path: Some("/taxes".to_string()),
        action_label: Some("Ver impostos".to_string()),
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn bill(id: &str, amount: &str, next_due: NaiveDate, is_active: bool) -> Bill {
        Bill {
            id: id.to_string(),
            user_id: "user-1".to_string(),
            name: format!("Conta {id}"),
            company: "Fornecedor".to_string(),
            amount: dec(amount),
            next_due,
            is_active,
        }
    }

    fn employee(id: &str, next_vacation: Option<NaiveDate>, status: &str) -> Employee {
        Employee {
            id: id.to_string(),
            user_id: "user-1".to_string(),
            name: format!("Funcionário {id}"),
            salary: dec("3000.00"),
            fgts_percentage: dec("8"),
            next_vacation,
            status: status.to_string(),
        }
    }

    #[test]
    fn test_bill_due_tomorrow_is_high_priority() {
        let today = date(2025, 1, 1);
        let bills = vec![bill("b1", "150.00", date(2025, 1, 2), true)];

        let alerts = evaluate(today, &bills, &[]);

        assert_eq!(alerts.len(), 1);
        let alert = &alerts[0];
        assert_eq!(alert.id, "bill-b1");
        assert_eq!(alert.alert_type, AlertType::Bill);
        assert_eq!(alert.priority, Priority::High);
        assert_eq!(alert.date, date(2025, 1, 2));
        assert!(alert.description.contains("R$ 150,00"));
        assert!(alert.description.contains("1 dia"));
        assert!(!alert.is_read);
    }

    #[test]
    fn test_bill_window_boundaries() {
        let today = date(2025, 6, 10);
        let bills = vec![
            bill("due-today", "10", date(2025, 6, 10), true),
            bill("due-7d", "10", date(2025, 6, 17), true),
            bill("due-8d", "10", date(2025, 6, 18), true),
            bill("overdue", "10", date(2025, 6, 9), true),
        ];

        let alerts = evaluate(today, &bills, &[]);
        let ids: Vec<&str> = alerts.iter().map(|a| a.id.as_str()).collect();

        assert!(ids.contains(&"bill-due-today"));
        assert!(ids.contains(&"bill-due-7d"));
        assert!(!ids.contains(&"bill-due-8d"));
        assert!(!ids.contains(&"bill-overdue"));
    }

    #[test]
    fn test_inactive_bill_produces_no_alert() {
        let today = date(2025, 1, 1);
        let bills = vec![bill("b1", "150.00", date(2025, 1, 2), false)];
        assert!(evaluate(today, &bills, &[]).is_empty());
    }

    #[test]
    fn test_bill_priority_bands() {
        let today = date(2025, 6, 10);
        let bills = vec![
            bill("d2", "10", date(2025, 6, 12), true),
            bill("d3", "10", date(2025, 6, 13), true),
            bill("d5", "10", date(2025, 6, 15), true),
            bill("d6", "10", date(2025, 6, 16), true),
        ];

        let alerts = evaluate(today, &bills, &[]);
        let by_id = |id: &str| alerts.iter().find(|a| a.id == format!("bill-{id}")).unwrap();

        assert_eq!(by_id("d2").priority, Priority::High);
        assert_eq!(by_id("d3").priority, Priority::Medium);
        assert_eq!(by_id("d5").priority, Priority::Medium);
        assert_eq!(by_id("d6").priority, Priority::Low);
    }

    #[test]
    fn test_vacation_in_ten_days_is_medium() {
        let today = date(2025, 6, 10);
        let employees = vec![employee("e1", Some(date(2025, 6, 20)), "active")];

        let alerts = evaluate(today, &[], &employees);
        let vacation: Vec<_> = alerts.iter().filter(|a| a.id.starts_with("vacation-")).collect();

        assert_eq!(vacation.len(), 1);
        assert_eq!(vacation[0].id, "vacation-e1");
        assert_eq!(vacation[0].alert_type, AlertType::Employee);
        assert_eq!(vacation[0].priority, Priority::Medium);
    }

    #[test]
    fn test_vacation_in_five_days_is_high() {
        let today = date(2025, 6, 10);
        let employees = vec![employee("e1", Some(date(2025, 6, 15)), "active")];

        let alerts = evaluate(today, &[], &employees);
        let alert = alerts.iter().find(|a| a.id == "vacation-e1").unwrap();
        assert_eq!(alert.priority, Priority::High);
    }

    #[test]
    fn test_overdue_vacation_uses_distinct_id_and_suppresses_upcoming() {
        let today = date(2025, 6, 10);
        let employees = vec![employee("e1", Some(date(2025, 6, 1)), "active")];

        let alerts = evaluate(today, &[], &employees);
        let vacation: Vec<_> = alerts.iter().filter(|a| a.id.contains("vacation")).collect();

        assert_eq!(vacation.len(), 1);
        assert_eq!(vacation[0].id, "vacation-overdue-e1");
        assert_eq!(vacation[0].priority, Priority::High);
    }

    #[test]
    fn test_vacation_beyond_thirty_days_is_silent() {
        let today = date(2025, 6, 10);
        let employees = vec![employee("e1", Some(date(2025, 7, 11)), "active")];

        let alerts = evaluate(today, &[], &employees);
        assert!(alerts.iter().all(|a| !a.id.starts_with("vacation-")));
    }

    #[test]
    fn test_fgts_emitted_within_due_window() {
        // June 10th: FGTS window closed, vacation far away
        let employees = vec![
            employee("e1", None, "active"),
            employee("e2", None, "active"),
        ];

        let closed = evaluate(date(2025, 6, 10), &[], &employees);
        assert!(closed.iter().all(|a| !a.id.starts_with("fgts-")));

        let open = evaluate(date(2025, 6, 3), &[], &employees);
        let fgts: Vec<_> = open.iter().filter(|a| a.id.starts_with("fgts-")).collect();
        assert_eq!(fgts.len(), 2);
        assert!(fgts.iter().all(|a| a.alert_type == AlertType::Tax));
        assert!(fgts.iter().all(|a| a.date == date(2025, 6, 7)));
    }

    #[test]
    fn test_fgts_skips_inactive_employees() {
        let employees = vec![
            employee("e1", None, "active"),
            employee("e2", None, "inactive"),
        ];

        let alerts = evaluate(date(2025, 6, 3), &[], &employees);
        let ids: Vec<&str> = alerts.iter().map(|a| a.id.as_str()).collect();
        assert!(ids.contains(&"fgts-e1"));
        assert!(!ids.contains(&"fgts-e2"));
    }

    #[test]
    fn test_fgts_priority_and_amount() {
        let employees = vec![employee("e1", None, "active")];

        // 4 days to the 7th -> medium
        let early = evaluate(date(2025, 6, 3), &[], &employees);
        assert_eq!(early[0].priority, Priority::Medium);

        // 1 day to the 7th -> high
        let late = evaluate(date(2025, 6, 6), &[], &employees);
        assert_eq!(late[0].priority, Priority::High);

        // 8% of R$ 3.000,00 = R$ 240,00, decimal-exact
        assert!(late[0].description.contains("R$ 240,00"));
    }

    #[test]
    fn test_fgts_independent_of_vacation() {
        // Vacation overdue AND FGTS window open: both alerts emitted
        let employees = vec![employee("e1", Some(date(2025, 5, 1)), "active")];

        let alerts = evaluate(date(2025, 6, 3), &[], &employees);
        let ids: Vec<&str> = alerts.iter().map(|a| a.id.as_str()).collect();
        assert!(ids.contains(&"fgts-e1"));
        assert!(ids.contains(&"vacation-overdue-e1"));
    }

    #[test]
    fn test_irpf_only_near_deadline() {
        // Early March: more than 30 days remain
        assert!(evaluate(date(2025, 3, 10), &[], &[]).is_empty());

        // March 31: exactly 30 days remain
        let march = evaluate(date(2025, 3, 31), &[], &[]);
        assert_eq!(march.len(), 1);
        assert_eq!(march[0].id, "tax-irpf-2025");
        assert_eq!(march[0].priority, Priority::Medium);
        assert_eq!(march[0].date, date(2025, 4, 30));

        // April 25: 5 days remain
        let april = evaluate(date(2025, 4, 25), &[], &[]);
        assert_eq!(april[0].priority, Priority::High);

        // May: out of season
        assert!(evaluate(date(2025, 5, 2), &[], &[]).is_empty());
    }

    #[test]
    fn test_sorted_by_priority_then_date() {
        let today = date(2025, 6, 10);
        let bills = vec![
            bill("low-late", "10", date(2025, 6, 16), true),   // low, 16th
            bill("med-near", "10", date(2025, 6, 13), true),   // medium, 13th
            bill("high-near", "10", date(2025, 6, 11), true),  // high, 11th
            bill("high-later", "10", date(2025, 6, 12), true), // high, 12th
            bill("med-late", "10", date(2025, 6, 15), true),   // medium, 15th
        ];
        let employees = vec![employee("e1", Some(date(2025, 6, 25)), "active")]; // medium, 25th

        let alerts = evaluate(today, &bills, &employees);
        let ids: Vec<&str> = alerts.iter().map(|a| a.id.as_str()).collect();

        assert_eq!(
            ids,
            vec![
                "bill-high-near",
                "bill-high-later",
                "bill-med-near",
                "bill-med-late",
                "vacation-e1",
                "bill-low-late",
            ]
        );
    }

    #[test]
    fn test_evaluation_is_deterministic() {
        let today = date(2025, 4, 3);
        let bills = vec![
            bill("b1", "99.90", date(2025, 4, 4), true),
            bill("b2", "1500", date(2025, 4, 9), true),
        ];
        let employees = vec![
            employee("e1", Some(date(2025, 4, 20)), "active"),
            employee("e2", Some(date(2025, 3, 1)), "active"),
        ];

        let first = evaluate(today, &bills, &employees);
        let second = evaluate(today, &bills, &employees);
        assert_eq!(first, second);
        // One alert per underlying fact, never duplicated
        let mut ids: Vec<&str> = first.iter().map(|a| a.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), first.len());
    }

    #[test]
    fn test_alert_serializes_camel_case() {
        let today = date(2025, 1, 1);
        let bills = vec![bill("b1", "150.00", date(2025, 1, 2), true)];
        let alerts = evaluate(today, &bills, &[]);

        let json = serde_json::to_value(&alerts[0]).unwrap();
        assert_eq!(json["type"], "bill");
        assert_eq!(json["priority"], "high");
        assert_eq!(json["isRead"], false);
        assert_eq!(json["date"], "2025-01-02");
        assert_eq!(json["relatedEntity"], "bill");
        assert!(json.get("related_id").is_none());
    }

    #[test]
    fn test_alert_type_round_trip() {
        for t in [
            AlertType::Bill,
            AlertType::Employee,
            AlertType::Expense,
            AlertType::Achievement,
            AlertType::Tax,
            AlertType::Asset,
            AlertType::Investment,
        ] {
            assert_eq!(AlertType::parse(t.as_str()), Some(t));
        }
        assert_eq!(AlertType::parse("unknown"), None);
    }
}
