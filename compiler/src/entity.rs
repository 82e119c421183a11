//! Struct and table declarations.
//!
//! Fields are exposed three ways, all rendered from the single list returned
//! by [`field_accessors`]:
//!
//! - `Base.propertynames` listing the field symbols,
//! - `Base.getproperty(x, field::Symbol)` dispatching on the symbol,
//! - `Base.getindex(x, ::Type{<Name>Properties.<field>})` dispatching on a
//!   marker type per field.

use flatjl_schema::{Namespace, Schema, StructDef};
use log::debug;

use crate::accessor::{field_accessors, render_accessor, FieldAccessor};
use crate::builder::{builder_plan, render_builder, BuilderPlan};
use crate::error::GenError;
use crate::namespace::Import;
use crate::type_map::EntityContext;

/// Generated code for one schema entity, plus the imports it needs.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityCode {
    pub name:      String,
    pub namespace: Namespace,
    pub code:      String,
    pub imports:   Vec<Import>,
}

impl EntityCode {
    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }
}

/// Everything derived from one struct or table.
#[derive(Debug, Clone, PartialEq)]
pub struct StructArtifacts {
    pub accessors: Vec<FieldAccessor>,
    pub builder:   BuilderPlan,
}

pub(crate) fn gen_comment(doc: &[String], code: &mut String) {
    for line in doc {
        if line.is_empty() {
            code.push_str("#\n");
        } else {
            code.push_str("# ");
            code.push_str(line.trim_end());
            code.push('\n');
        }
    }
}

fn begin_class(def: &StructDef, code: &mut String) {
    let kind = if def.fixed { "FlatBuffers.Struct" } else { "FlatBuffers.Table" };
    code.push_str(&format!("struct {} <: {}\n", def.name, kind));
    code.push_str("\tbytes::Vector{UInt8}\n");
    code.push_str("\tpos::Base.Int\n");
    code.push_str("end\n\n");
}

fn gen_property_names(def: &StructDef, accessors: &[FieldAccessor], code: &mut String) {
    code.push_str(&format!("Base.propertynames(::{}) = (\n", def.name));
    for acc in accessors {
        code.push_str(&format!("\t:{},\n", acc.ident));
    }
    code.push_str(")\n\n");
}

fn gen_get_property(def: &StructDef, accessors: &[FieldAccessor], code: &mut String) {
    code.push_str(&format!("function Base.getproperty(x::{}, field::Symbol)\n", def.name));
    for (i, acc) in accessors.iter().enumerate() {
        let keyword = if i == 0 { "if" } else { "elseif" };
        code.push_str(&format!("\t{} field === :{}\n", keyword, acc.ident));
        code.push_str(&render_accessor(acc, "\t\t"));
    }
    if !accessors.is_empty() {
        code.push_str("\tend\n");
    }
    code.push_str("\treturn nothing\n");
    code.push_str("end\n\n");
}

fn properties_module(def: &StructDef) -> String {
    format!("{}Properties", def.name)
}

fn gen_property_types(def: &StructDef, accessors: &[FieldAccessor], code: &mut String) {
    code.push_str(&format!("module {}\n", properties_module(def)));
    code.push_str("abstract type AbstractProperty end\n");
    for acc in accessors {
        code.push_str(&format!("struct {} <: AbstractProperty end\n", acc.ident));
    }
    code.push_str("end\n\n");
}

fn gen_get_index(def: &StructDef, accessors: &[FieldAccessor], code: &mut String) {
    let module = properties_module(def);
    for acc in accessors {
        code.push_str(&format!(
            "function Base.getindex(x::{}, ::Type{{{}.{}}})\n",
            def.name, module, acc.ident
        ));
        code.push_str(&render_accessor(acc, "\t"));
        if acc.accessor.falls_through() {
            code.push_str("\treturn nothing\n");
        }
        code.push_str("end\n\n");
    }
}

/// Derives accessors and builder for `def` within `cx`.
pub fn struct_artifacts(
    cx: &mut EntityContext,
    def: &StructDef,
    strict_unions: bool,
) -> Result<StructArtifacts, GenError> {
    let accessors = field_accessors(cx, def, strict_unions)?;
    let builder = builder_plan(cx, def, strict_unions)?;
    Ok(StructArtifacts { accessors, builder })
}

/// Emits the declaration block for a struct or table. Imports are tracked on
/// a context that lives only for this call.
pub fn gen_struct(schema: &Schema, def: &StructDef, strict_unions: bool) -> Result<EntityCode, GenError> {
    let mut cx = EntityContext::new(schema, &def.namespace, &def.name);
    let mut code = String::new();

    if !def.generated {
        debug!("emitting {} {}", if def.fixed { "struct" } else { "table" }, def.name);
        let artifacts = struct_artifacts(&mut cx, def, strict_unions)?;

        gen_comment(&def.doc_comment, &mut code);
        begin_class(def, &mut code);

        gen_property_names(def, &artifacts.accessors, &mut code);
        gen_get_property(def, &artifacts.accessors, &mut code);

        gen_property_types(def, &artifacts.accessors, &mut code);
        gen_get_index(def, &artifacts.accessors, &mut code);

        code.push_str(&render_builder(&artifacts.builder));
    }

    Ok(EntityCode {
        name: def.name.clone(),
        namespace: def.namespace.clone(),
        code,
        imports: cx.finish(),
    })
}
