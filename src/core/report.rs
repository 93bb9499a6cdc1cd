//! Renders findings into the plain-text report, the alert subject and the
//! chat (Slack Block Kit) message.

use crate::domain::model::{AlertReport, AnomalyFinding};
use serde_json::{json, Value};

/// Maximum number of findings included in the chat message.
pub const CHAT_MESSAGE_LIMIT: usize = 5;

/// Topic subjects are capped by the transport.
pub const SUBJECT_MAX_CHARS: usize = 100;

#[derive(Debug, Clone, PartialEq)]
pub struct RunMetadata {
    pub environment: String,
    pub threshold_percent: f64,
    pub lookback_days: u32,
}

pub fn build_alert_report(findings: &[AnomalyFinding], meta: &RunMetadata) -> AlertReport {
    AlertReport {
        subject: format_subject(findings.len()),
        text_body: format_text_report(findings, meta),
        chat_message: build_chat_message(findings, meta),
    }
}

pub fn format_subject(count: usize) -> String {
    truncate_subject(&format!("⚠️ FinOps Alert: {} cost anomalies detected", count))
}

/// Cuts `subject` to at most [`SUBJECT_MAX_CHARS`] characters, never inside
/// a multi-byte character.
pub fn truncate_subject(subject: &str) -> String {
    subject.chars().take(SUBJECT_MAX_CHARS).collect()
}

pub fn format_text_report(findings: &[AnomalyFinding], meta: &RunMetadata) -> String {
    let mut lines = vec![
        format!("FinOps Cost Anomaly Report — {}", meta.environment),
        format!(
            "Threshold: ±{}% | Lookback: {} days",
            meta.threshold_percent, meta.lookback_days
        ),
        "-".repeat(50),
    ];

    for finding in findings {
        let direction = if finding.is_increase() { "↑" } else { "↓" };
        lines.push(format!(
            "{} {}: {} (avg: {}) — {}",
            direction,
            finding.category,
            format_currency(finding.current_value),
            format_currency(finding.baseline_average),
            format_signed_percent(finding.deviation_percent)
        ));
    }

    lines.join("\n")
}

pub fn build_chat_message(findings: &[AnomalyFinding], meta: &RunMetadata) -> Value {
    let mut blocks = vec![
        json!({
            "type": "header",
            "text": {
                "type": "plain_text",
                "text": format!("⚠️ {} Cost Anomalies Detected", findings.len()),
            },
        }),
        json!({
            "type": "section",
            "text": {
                "type": "mrkdwn",
                "text": format!(
                    "*Environment:* `{}` | *Threshold:* ±{}% | *Lookback:* {} days",
                    meta.environment, meta.threshold_percent, meta.lookback_days
                ),
            },
        }),
        json!({ "type": "divider" }),
    ];

    for finding in findings.iter().take(CHAT_MESSAGE_LIMIT) {
        let direction = if finding.is_increase() { "📈" } else { "📉" };
        blocks.push(json!({
            "type": "section",
            "text": {
                "type": "mrkdwn",
                "text": format!(
                    "{} *{}*\nCurrent: `{}` | Avg: `{}` | Deviation: `{}`",
                    direction,
                    finding.category,
                    format_currency(finding.current_value),
                    format_currency(finding.baseline_average),
                    format_signed_percent(finding.deviation_percent)
                ),
            },
        }));
    }

    json!({ "blocks": blocks })
}

/// `1234.5` -> `$1,234.50`
pub fn format_currency(value: f64) -> String {
    let formatted = format!("{:.2}", value.abs());
    let (integer, fraction) = formatted.split_once('.').unwrap_or((formatted.as_str(), "00"));

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (i, digit) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if value < 0.0 { "-" } else { "" };
    format!("{}${}.{}", sign, grouped, fraction)
}

pub fn format_signed_percent(value: f64) -> String {
    format!("{:+.1}%", value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{FindingKind, ALL_CATEGORIES};
    use chrono::NaiveDate;

    fn meta() -> RunMetadata {
        RunMetadata {
            environment: "production".to_string(),
            threshold_percent: 30.0,
            lookback_days: 7,
        }
    }

    fn finding(category: &str, current: f64, average: f64, deviation: f64) -> AnomalyFinding {
        AnomalyFinding {
            kind: if category == ALL_CATEGORIES {
                FindingKind::Aggregate
            } else {
                FindingKind::PerCategory
            },
            category: category.to_string(),
            date: NaiveDate::from_ymd_opt(2026, 10, 17).unwrap(),
            current_value: current,
            baseline_average: average,
            deviation_percent: deviation,
        }
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(0.0), "$0.00");
        assert_eq!(format_currency(999.5), "$999.50");
        assert_eq!(format_currency(1234.5), "$1,234.50");
        assert_eq!(format_currency(1234567.891), "$1,234,567.89");
    }

    #[test]
    fn test_format_signed_percent() {
        assert_eq!(format_signed_percent(40.0), "+40.0%");
        assert_eq!(format_signed_percent(-12.3), "-12.3%");
    }

    #[test]
    fn test_text_report_lines() {
        let findings = vec![
            finding("Amazon EC2", 3000.0, 2000.0, 50.0),
            finding("Amazon RDS", 20.0, 100.0, -80.0),
        ];
        let report = format_text_report(&findings, &meta());
        let lines: Vec<&str> = report.lines().collect();

        assert_eq!(lines[0], "FinOps Cost Anomaly Report — production");
        assert_eq!(lines[1], "Threshold: ±30% | Lookback: 7 days");
        assert_eq!(lines[2], "-".repeat(50));
        assert_eq!(lines[3], "↑ Amazon EC2: $3,000.00 (avg: $2,000.00) — +50.0%");
        assert_eq!(lines[4], "↓ Amazon RDS: $20.00 (avg: $100.00) — -80.0%");
        assert_eq!(lines.len(), 5);
    }

    #[test]
    fn test_subject() {
        assert_eq!(format_subject(3), "⚠️ FinOps Alert: 3 cost anomalies detected");
        assert!(format_subject(usize::MAX).chars().count() <= SUBJECT_MAX_CHARS);
    }

    #[test]
    fn test_long_subject_is_truncated_on_char_boundary() {
        let subject = format!("⚠️ {}", "異常".repeat(80));
        let truncated = truncate_subject(&subject);

        assert_eq!(truncated.chars().count(), SUBJECT_MAX_CHARS);
        assert!(subject.starts_with(&truncated));
        assert!(truncated.ends_with('異') || truncated.ends_with('常'));

        let short = "⚠️ FinOps Alert: 1 cost anomalies detected";
        assert_eq!(truncate_subject(short), short);
    }

    #[test]
    fn test_chat_message_caps_entries() {
        let findings: Vec<_> = (0..8)
            .map(|i| finding(&format!("Service {}", i), 200.0, 100.0, 100.0 - i as f64))
            .collect();
        let message = build_chat_message(&findings, &meta());
        let blocks = message["blocks"].as_array().unwrap();

        assert_eq!(blocks.len(), 3 + CHAT_MESSAGE_LIMIT);
        assert_eq!(blocks[0]["text"]["text"], "⚠️ 8 Cost Anomalies Detected");
        assert_eq!(
            blocks[1]["text"]["text"],
            "*Environment:* `production` | *Threshold:* ±30% | *Lookback:* 7 days"
        );
        assert_eq!(blocks[2]["type"], "divider");
        assert!(blocks[3]["text"]["text"]
            .as_str()
            .unwrap()
            .starts_with("📈 *Service 0*"));
    }

    #[test]
    fn test_chat_entry_format() {
        let message = build_chat_message(&[finding(ALL_CATEGORIES, 70.0, 100.0, -30.5)], &meta());
        assert_eq!(
            message["blocks"][3]["text"]["text"],
            "📉 *ALL SERVICES*\nCurrent: `$70.00` | Avg: `$100.00` | Deviation: `-30.5%`"
        );
    }

    #[test]
    fn test_alert_report_keeps_findings_order() {
        let findings = vec![
            finding("B", 300.0, 100.0, 200.0),
            finding("A", 150.0, 100.0, 50.0),
        ];
        let report = build_alert_report(&findings, &meta());
        let b = report.text_body.find("↑ B:").unwrap();
        let a = report.text_body.find("↑ A:").unwrap();
        assert!(b < a);
        assert_eq!(report.subject, format_subject(2));
    }
}
