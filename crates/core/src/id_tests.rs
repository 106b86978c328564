use super::RowId;

#[test]
fn displays_inner_string() {
    let id = RowId::new("exp1");
    assert_eq!(id.to_string(), "exp1");
    assert_eq!(id.as_str(), "exp1");
}

#[test]
fn compares_against_str() {
    let id = RowId::new("exp1");
    assert_eq!(id, "exp1");
    assert_eq!(id, *"exp1");
}

#[test]
fn usable_as_hashmap_key_via_borrow() {
    use std::collections::HashMap;
    let mut map: HashMap<RowId, i32> = HashMap::new();
    map.insert(RowId::new("exp1"), 1);
    assert_eq!(map.get("exp1"), Some(&1));
}
