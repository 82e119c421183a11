use flatjl_schema::EnumDef;
use log::debug;

use crate::entity::{gen_comment, EntityCode};
use crate::type_map::basic_type_name;

/// `FlatBuffers.@scopedenum Color::UInt8 Red=0 Green=1 Blue=2`
///
/// Members keep declaration order and their literal values; gaps and
/// duplicates pass through untouched.
pub fn gen_enum(def: &EnumDef) -> EntityCode {
    let mut code = String::new();
    if !def.generated {
        debug!("emitting enum {}", def.name);
        gen_comment(&def.doc_comment, &mut code);
        code.push_str(&format!(
            "FlatBuffers.@scopedenum {}::{}",
            def.name,
            basic_type_name(def.underlying)
        ));
        for val in &def.values {
            code.push_str(&format!(" {}={}", val.name, val.value));
        }
        code.push_str("\n\n");
    }

    EntityCode {
        name: def.name.clone(),
        namespace: def.namespace.clone(),
        code,
        imports: Vec::new(),
    }
}
