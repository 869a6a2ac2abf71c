use canteen_api::routes::health::HealthData;

#[test]
fn health_reports_database_state() {
    let up = HealthData::new(true);
    assert_eq!(up.status, "ok");
    assert_eq!(up.database, "up");

    let down = HealthData::new(false);
    assert_eq!(down.status, "ok");
    assert_eq!(down.database, "down");
}
