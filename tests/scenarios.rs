use chrono::{NaiveDate, NaiveDateTime};
use pim_sqlite::{
    Category, Database, Gender, ItemFields, ItemFilter, ProfileFields, ScheduleStatus,
};

const USER: i64 = 1;

fn ts(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
}

fn setup() -> Database {
    let db = Database::open_in_memory().expect("open in-memory database");
    let profile = ProfileFields {
        name: "Li Wei".into(),
        gender: Some(Gender::Male),
        birth_date: NaiveDate::from_ymd_opt(1990, 1, 1),
        ..ProfileFields::default()
    };
    db.profiles().save_profile(USER, &profile).expect("save profile");
    db
}

#[test]
fn profile_scenario_has_empty_contact_fields() {
    let db = setup();

    let p = db.profiles().get_profile(USER).unwrap().expect("profile exists");
    assert_eq!(p.name, "Li Wei");
    assert_eq!(p.gender, Some(Gender::Male));
    assert_eq!(p.birth_date, NaiveDate::from_ymd_opt(1990, 1, 1));
    assert!(p.email.is_none() && p.phone.is_none() && p.address.is_none());
}

#[test]
fn meeting_moves_between_filters_when_completed() {
    let db = setup();
    let schedule = db.schedule();

    let mut meeting = ItemFields::new("Meeting", ts("2024-06-01 09:00:00"));
    meeting.status = ScheduleStatus::Pending;
    meeting.category = Some(Category::Work);
    let id = schedule.add_item(USER, &meeting).unwrap();

    let in_work = schedule.list_items(USER, ItemFilter::ByCategory(Category::Work)).unwrap();
    assert!(in_work.iter().any(|i| i.id == id));
    let done = schedule.list_items(USER, ItemFilter::completed()).unwrap();
    assert!(done.iter().all(|i| i.id != id));

    // Pick it the way the edit screen does: label list, then the structured id.
    let label = schedule
        .list_item_labels(USER)
        .unwrap()
        .into_iter()
        .find(|l| l.title == "Meeting")
        .unwrap();
    let mut edited = ItemFields::from(&schedule.get_item(label.id).unwrap().unwrap());
    edited.status = ScheduleStatus::Completed;
    schedule.update_item(label.id, &edited).unwrap();

    let mut older = ItemFields::new("Retro", ts("2024-05-01 15:00:00"));
    older.status = ScheduleStatus::Completed;
    schedule.add_item(USER, &older).unwrap();

    let done: Vec<String> = schedule
        .list_items(USER, ItemFilter::completed())
        .unwrap()
        .into_iter()
        .map(|i| i.title)
        .collect();
    assert_eq!(done, vec!["Meeting", "Retro"]);

    let pending = schedule.list_items(USER, ItemFilter::pending()).unwrap();
    assert!(pending.iter().all(|i| i.id != id));
}

#[test]
fn deleting_the_owner_removes_its_schedule() {
    let db = setup();
    let schedule = db.schedule();
    schedule
        .add_item(USER, &ItemFields::new("One", ts("2024-06-01 09:00:00")))
        .unwrap();
    schedule
        .add_item(USER, &ItemFields::new("Two", ts("2024-06-02 09:00:00")))
        .unwrap();

    db.connection()
        .execute("DELETE FROM user_basic WHERE user_id = ?1", [USER])
        .unwrap();

    assert!(schedule.list_items(USER, ItemFilter::All).unwrap().is_empty());
    assert!(schedule.list_item_labels(USER).unwrap().is_empty());
}

#[test]
fn metrics_record_store_operations() {
    let db = setup();
    db.schedule().list_items(USER, ItemFilter::All).unwrap();

    let text = pim_sqlite::gather_metrics();
    assert!(text.contains("pim_db_query_total"));
    assert!(text.contains("operation=\"save_profile\""));
}
