//! `struct Name { field: Type = default }`
//!
//! Becomes a class whose constructor takes the fields positionally, in
//! declaration order, with their defaults. The class also gets a `__str__`
//! rendering `Name(field=value, ...)`.

use rustc_hash::FxHashSet;
use ry_diagnostic::ErrorCode;
use ry_ir::{BinaryOp, Param, PassId, StmtKind, Tree};

use crate::build::Synth;
use crate::rewrite::{keep, rewrite_stmts};
use crate::{LoweringError, Pass, PassContext};

pub struct Records;

impl Pass for Records {
    fn id(&self) -> PassId {
        PassId::Records
    }

    fn run(&self, mut tree: Tree, _cx: &mut PassContext) -> Result<Tree, LoweringError> {
        rewrite_stmts(&mut tree.body, |stmt| {
            let StmtKind::Struct(record) = stmt.kind else {
                return keep(stmt);
            };
            let s = Synth::new(PassId::Records, stmt.span);

            let mut seen = FxHashSet::default();
            for field in &record.fields {
                if !seen.insert(field.name.as_str()) {
                    return Err(LoweringError::new(
                        PassId::Records,
                        ErrorCode::E2006,
                        field.span,
                        format!("field `{}` appears twice in struct `{}`", field.name, record.name),
                    ));
                }
            }

            let mut params = vec![s.param("self")];
            let mut init_body = Vec::new();
            for field in &record.fields {
                params.push(Param {
                    name: field.name.clone(),
                    ty: Some(field.ty.clone()),
                    default: field.default.clone(),
                    span: field.span,
                });
                init_body.push(s.assign(s.attr(s.name("self"), &field.name), s.name(&field.name)));
            }
            if init_body.is_empty() {
                init_body.push(s.stmt(StmtKind::Pass));
            }

            let mut text = s.str(format!("{}(", record.name));
            for (i, field) in record.fields.iter().enumerate() {
                let sep = if i == 0 { "" } else { ", " };
                let label = s.str(format!("{sep}{}=", field.name));
                let value = s.call_name("str", vec![s.attr(s.name("self"), &field.name)]);
                text = s.binary(BinaryOp::Add, text, label);
                text = s.binary(BinaryOp::Add, text, value);
            }
            text = s.binary(BinaryOp::Add, text, s.str(")"));

            let members = vec![
                s.func("__init__", params, init_body),
                s.func("__str__", vec![s.param("self")], vec![s.ret(Some(text))]),
            ];
            Ok(smallvec::smallvec![s.class(&record.name, members, record.private)])
        })?;
        Ok(tree)
    }
}
