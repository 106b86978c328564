use super::*;

#[test]
fn row_id_extracts_from_every_variant() {
    let id = RowId::new("row-1");
    let events = vec![
        SupervisorEvent::Started {
            row_id: id.clone(),
            pid: 1,
        },
        SupervisorEvent::Completed {
            row_id: id.clone(),
            weight_file: "w.pth".into(),
        },
        SupervisorEvent::Crashed {
            row_id: id.clone(),
            reason: "oom".into(),
        },
        SupervisorEvent::SpawnFailed {
            row_id: id.clone(),
            reason: "enoent".into(),
        },
        SupervisorEvent::TableWriteFailed {
            row_id: id.clone(),
            reason: "disk full".into(),
        },
    ];
    for event in events {
        assert_eq!(event.row_id(), &id);
    }
}

#[test]
fn notification_text_includes_row_id() {
    let event = SupervisorEvent::Crashed {
        row_id: RowId::new("row-7"),
        reason: "signal 9".into(),
    };
    let (title, message) = event.as_notification();
    assert!(title.contains("row-7"));
    assert_eq!(message, "signal 9");
}
