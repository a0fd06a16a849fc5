use pretty_assertions::assert_eq;
use rollcall_core::models::{
    attendance::AttendanceRecord,
    roster::{Member, Roster},
};
use serde_json::{from_str, json, to_value};

#[test]
fn test_attendance_record_serialization() {
    let record = AttendanceRecord {
        user_id: 1001,
        display_name: "Alice".to_string(),
        marked_at: "11:12:05 AM".to_string(),
    };

    let value = to_value(&record).expect("Failed to serialize record");
    assert_eq!(
        value,
        json!({
            "user_id": 1001,
            "display_name": "Alice",
            "marked_at": "11:12:05 AM",
        })
    );

    let deserialized: AttendanceRecord =
        from_str(&value.to_string()).expect("Failed to deserialize record");
    assert_eq!(deserialized, record);
}

#[test]
fn test_member_without_nickname_deserializes() {
    let member: Member = from_str(
        r#"{"user_id": 5, "username": "bob", "nickname": null, "bot": false}"#,
    )
    .expect("Failed to deserialize member");

    assert_eq!(member.display_name(), "bob");
}

#[test]
fn test_roster_preserves_fetch_order() {
    let members = ["zed", "amy", "kim"]
        .iter()
        .enumerate()
        .map(|(index, name)| Member {
            user_id: index as u64 + 1,
            username: name.to_string(),
            nickname: None,
            bot: false,
        });

    let roster = Roster::from_guild(members);
    let names: Vec<&str> = roster.members().iter().map(|m| m.display_name()).collect();

    assert_eq!(names, vec!["zed", "amy", "kim"]);
}
