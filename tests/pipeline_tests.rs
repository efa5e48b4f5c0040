use predicates::prelude::*;
use serde_json::json;
mod common;
use common::setup_test_env;

const NOW: i64 = 1_760_000_000;
const DAY: i64 = 86_400;

fn deals_in(counts: &[(&str, usize)]) -> serde_json::Value {
    let mut deals = Vec::new();
    for (stage, count) in counts {
        for i in 0..*count {
            deals.push(json!({
                "id": format!("{}-{}", stage, i),
                "stage": stage,
                "value": 100.0,
                "created_ts": NOW,
                "updated_ts": NOW
            }));
        }
    }
    json!({ "deals": deals })
}

#[test]
fn test_snapshot_conversion_rates() {
    let env = setup_test_env(
        deals_in(&[
            ("lead", 10),
            ("qualified", 4),
            ("proposal", 4),
            ("negotiation", 2),
            ("closed-won", 1),
        ]),
        "",
    );
    let output = env.cmd().args(["snapshot", "--json"]).output().unwrap();
    assert!(output.status.success());
    let snapshot: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();

    let rates: Vec<f64> = snapshot["stages"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["conversion_rate"].as_f64().unwrap())
        .collect();
    assert_eq!(rates, vec![100.0, 40.0, 100.0, 50.0, 50.0]);
    assert_eq!(snapshot["total_deals"], 21);
    assert_eq!(snapshot["open_deals"], 20);
    assert_eq!(snapshot["won_deals"], 1);
}

#[test]
fn test_snapshot_full_includes_empty_stages() {
    let env = setup_test_env(deals_in(&[("lead", 2)]), "");
    let output = env.cmd().args(["snapshot", "--full", "--json"]).output().unwrap();
    let snapshot: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(snapshot["stages"].as_array().unwrap().len(), 6);

    env.cmd()
        .arg("snapshot")
        .assert()
        .success()
        .stdout(predicate::str::contains("Lead"))
        .stdout(predicate::str::contains("Negotiation").not());
}

#[test]
fn test_snapshot_counts_corrupted_deals_in_entry_stage() {
    let env = setup_test_env(
        json!({"deals": [
            {"id": "a", "stage": "", "value": 10.0},
            {"id": "b", "stage": "k2Hf8sLq0Zp3XyWv", "value": 20.0}
        ]}),
        "",
    );
    let output = env.cmd().args(["snapshot", "--json"]).output().unwrap();
    let snapshot: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(snapshot["stages"][0]["stage_id"], "lead");
    assert_eq!(snapshot["stages"][0]["count"], 2);
    assert_eq!(snapshot["stages"][0]["total_value"], 30.0);
}

#[test]
fn test_stale_threshold_is_inclusive() {
    let env = setup_test_env(
        json!({"deals": [
            {"id": "old", "title": "Exactly two days", "stage": "proposal", "value": 1.0, "updated_ts": NOW - 2 * DAY},
            {"id": "new", "title": "Almost two days", "stage": "proposal", "value": 1.0, "updated_ts": NOW - 2 * DAY + 1},
            {"id": "won", "title": "Closed long ago", "stage": "closed-won", "value": 1.0, "updated_ts": NOW - 90 * DAY}
        ]}),
        "",
    );
    let output = env
        .cmd()
        .args(["stale", "--now", &NOW.to_string(), "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stale: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let stale = stale.as_array().unwrap();
    assert_eq!(stale.len(), 1);
    assert_eq!(stale[0]["deal_id"], "old");
    assert_eq!(stale[0]["elapsed_days"], 2);
    assert_eq!(stale[0]["severity"], "low");
}

#[test]
fn test_stale_threshold_override() {
    let env = setup_test_env(
        json!({"deals": [
            {"id": "old", "stage": "proposal", "value": 1.0, "updated_ts": NOW - 2 * DAY}
        ]}),
        "",
    );
    env.cmd()
        .args(["stale", "--now", &NOW.to_string(), "--threshold", "3d"])
        .assert()
        .success()
        .stdout("No stale deals.\n");

    env.cmd()
        .args(["stale", "--now", &NOW.to_string(), "--threshold", "soon"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Invalid threshold"));
}

#[test]
fn test_notifications_sorted_by_severity() {
    let env = setup_test_env(
        json!({
            "deals": [
                {"id": "d1", "title": "Quiet deal", "stage": "negotiation", "value": 1.0, "updated_ts": NOW - 8 * DAY}
            ],
            "tasks": [
                {"id": "t1", "title": "Call Maria", "due_ts": NOW - 4 * DAY},
                {"id": "t2", "title": "Done already", "due_ts": NOW - 4 * DAY, "completed": true}
            ],
            "quotes": [
                {"id": "q1", "title": "Annual plan", "status": "sent", "valid_until_ts": NOW - DAY}
            ]
        }),
        "",
    );
    let output = env
        .cmd()
        .args(["notifications", "--now", &NOW.to_string(), "--json"])
        .output()
        .unwrap();
    let notifications: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let ids: Vec<&str> = notifications
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["deal-d1", "task-t1", "quote-q1"]);
    assert_eq!(notifications[0]["severity"], "high");
    assert_eq!(notifications[1]["message"], "\"Call Maria\" is 4 days overdue");
    assert_eq!(notifications[2]["message"], "Quote \"Annual plan\" expired 1 day ago");

    env.cmd()
        .args(["notifications", "--now", &NOW.to_string()])
        .assert()
        .success()
        .stdout(predicate::str::contains("[high  ] Stale deal"));
}

#[test]
fn test_health_reports_bottleneck() {
    let env = setup_test_env(deals_in(&[("lead", 1), ("proposal", 6)]), "");
    let output = env.cmd().args(["health", "--json"]).output().unwrap();
    assert!(output.status.success());
    let health: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(health["open_deals"], 7);
    assert_eq!(health["distribution"]["kind"], "bottleneck");
    assert_eq!(health["distribution"]["stage"], "proposal");
}

#[test]
fn test_report_period() {
    let env = setup_test_env(
        json!({
            "clients": [
                {"id": "c1", "name": "Acme", "created_ts": NOW - DAY},
                {"id": "c2", "name": "Globex", "created_ts": NOW - 60 * DAY}
            ],
            "deals": [
                {"id": "d1", "stage": "closed-won", "value": 1500.0, "created_ts": NOW - 3 * DAY},
                {"id": "d2", "stage": "proposal", "value": 900.0, "created_ts": NOW - 3 * DAY},
                {"id": "d3", "stage": "closed-won", "value": 1000.0, "created_ts": NOW - 10 * DAY}
            ]
        }),
        "",
    );
    let output = env
        .cmd()
        .args(["report", "--period", "7d", "--now", &NOW.to_string(), "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["period"], "7d");
    assert_eq!(report["revenue"], 1500.0);
    assert_eq!(report["previous_revenue"], 1000.0);
    assert_eq!(report["revenue_change"], 50.0);
    assert_eq!(report["new_clients"], 1);
    assert_eq!(report["active_deals"], 1);
    assert_eq!(report["won_deals"], 1);

    env.cmd()
        .args(["report", "--period", "2w"])
        .assert()
        .failure()
        .code(1);
}
