use super::*;

#[test]
fn exit_codes() {
    let usage = DriverError::Usage("no file".into());
    assert_eq!(usage.exit_code(), 1);
    let unit = SourceUnit::inline("trash_cleaner = true\n");
    let tree = ry_parse::parse(&unit).unwrap();
    let failed = DriverError::Exec {
        program: Some(Box::new(Program::new(&unit, tree, ry_diagnostic::BlockRegistry::new()))),
        error: ExecError::ChildFailed(2),
    };
    assert_eq!(failed.exit_code(), 2);
    assert!(failed.is_reported());
    assert!(!usage.is_reported());
}

#[test]
fn broken_packages_are_source_errors() {
    let unit = SourceUnit::inline("trash_cleaner = true\n");
    let failed = ResolutionError::PackageFailed {
        name: "bad".into(),
        unit: unit.clone(),
        diagnostic: Box::new(ry_diagnostic::Diagnostic::error(ry_diagnostic::ErrorCode::E1001)),
    };
    let wrapped = ResolutionError::InPackage {
        package: "outer".into(),
        unit: unit.clone(),
        source: Box::new(failed.clone()),
    };
    for error in [failed, wrapped] {
        let driver = DriverError::Resolution {
            unit: unit.clone(),
            error,
        };
        assert_eq!(driver.exit_code(), 1);
    }
    let missing = DriverError::Resolution {
        unit,
        error: ResolutionError::ModuleNotFound {
            path: "std.Nope".into(),
            span: ry_ir::Span::DUMMY,
        },
    };
    assert_eq!(missing.exit_code(), 2);
}
