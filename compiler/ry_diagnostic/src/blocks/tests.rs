use super::*;

fn nested() -> BlockRegistry {
    let mut reg = BlockRegistry::new();
    reg.enter("Door", BlockKind::Type, 1);
    reg.enter("open", BlockKind::Method, 2);
    reg.exit(4);
    reg.exit(6);
    reg.enter("main", BlockKind::Function, 8);
    reg.exit(12);
    reg
}

#[test]
fn enter_records_depth_and_parent() {
    let reg = nested();
    assert!(reg.is_balanced());
    assert_eq!(reg.len(), 3);
    let (door_id, door) = reg.iter().next().unwrap();
    assert_eq!(door.depth, 1);
    assert_eq!(door.parent, None);
    let open = reg.get(door.children[0]).unwrap();
    assert_eq!(open.depth, 2);
    assert_eq!(open.parent, Some(door_id));
    assert_eq!(open.end_line, Some(4));
}

#[test]
fn depth_counts() {
    let reg = nested();
    assert_eq!(reg.at_depth(1).count(), 2);
    assert_eq!(reg.at_depth(2).count(), 1);
}

#[test]
fn innermost_and_hierarchy() {
    let reg = nested();
    assert_eq!(
        reg.hierarchy_at(3),
        vec!["pack Door".to_string(), "method open".to_string()]
    );
    assert_eq!(reg.hierarchy_at(5), vec!["pack Door".to_string()]);
    assert_eq!(reg.hierarchy_at(10), vec!["func main".to_string()]);
    assert!(reg.hierarchy_at(7).is_empty());
}

#[test]
fn exit_on_empty_stack_is_none() {
    let mut reg = BlockRegistry::new();
    assert_eq!(reg.exit(1), None);
    let id = reg.enter("f", BlockKind::Function, 1);
    assert_eq!(reg.current(), Some(id));
    assert!(!reg.is_balanced());
    assert!(reg.get(id).unwrap().contains_line(100));
}

#[test]
fn remap_moves_both_ends() {
    let mut reg = nested();
    reg.remap_lines(|line| line * 2, |line| line * 2 + 1);
    let (_, door) = reg.iter().next().unwrap();
    assert_eq!((door.start_line, door.end_line), (2, Some(13)));
    assert_eq!(reg.hierarchy_at(20), vec!["func main".to_string()]);
}
