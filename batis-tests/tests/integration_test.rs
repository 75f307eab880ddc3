//! Integration tests over the mapper code generated by build.rs
//!
//! build.rs renders `fixtures/schema.sql` into OUT_DIR with package
//! `com.example.shop` and the `t_` prefix stripped. These tests read that
//! tree back and check the artifacts against the schema, regenerate into
//! temporary directories, and run the cross-reference tools on the output.

use std::fs;
use std::path::{Path, PathBuf};

use batis_codegen::codegen::{to_field_name, ArtifactKind, ModelOptions, TypeMapper};
use batis_codegen::parser::{parse_schema, TableDescriptor};
use batis_codegen::xref::{scaffold_file, CrossReferenceResolver, Resolution, Scaffold};
use batis_codegen::{CodegenBuilder, NamingStrategy};

const SCHEMA: &str = include_str!("../fixtures/schema.sql");
const PACKAGE: &str = "com.example.shop";

fn out_dir() -> PathBuf {
    PathBuf::from(env!("OUT_DIR"))
}

fn schema_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/schema.sql")
}

fn tables() -> Vec<TableDescriptor> {
    parse_schema(SCHEMA).expect("fixture schema parses")
}

fn options() -> ModelOptions {
    ModelOptions {
        package_name: PACKAGE.to_string(),
        naming_strategy: NamingStrategy::CamelCase,
        strip_prefixes: Some(vec!["t_".to_string()]),
    }
}

fn read_artifact(root: &Path, kind: ArtifactKind, class_name: &str) -> String {
    let path = root.join(kind.relative_path(PACKAGE, class_name));
    fs::read_to_string(&path).unwrap_or_else(|e| panic!("{}: {}", path.display(), e))
}

/// Same configuration as [package.metadata.batis-codegen], into `dir`
fn generate_into(dir: &Path) -> batis_codegen::GenerationReport {
    CodegenBuilder::new(schema_path())
        .output_dir(dir)
        .package_name(PACKAGE)
        .strip_prefixes(&["t_"])
        .generate()
        .expect("generation succeeds")
}

/// Field names referenced as `#{field,...}` parameters
fn bound_parameters(xml: &str) -> Vec<String> {
    xml.split("#{")
        .skip(1)
        .filter_map(|rest| rest.split([',', '}']).next())
        .map(str::to_string)
        .collect()
}

/// Values of `property="..."` attributes
fn bound_properties(xml: &str) -> Vec<String> {
    xml.split("property=\"")
        .skip(1)
        .filter_map(|rest| rest.split('"').next())
        .map(str::to_string)
        .collect()
}

// ============================================================================
// Generated tree
// ============================================================================

#[test]
fn test_class_names_strip_prefix() {
    let opts = options();
    let names: Vec<String> = tables().iter().map(|t| opts.class_name(&t.name)).collect();
    assert_eq!(names, vec!["User", "Order", "OrderItem", "OperationLog"]);
}

#[test]
fn test_all_artifacts_generated() {
    let opts = options();
    for table in tables() {
        let class_name = opts.class_name(&table.name);
        for kind in ArtifactKind::ALL {
            let path = out_dir().join(kind.relative_path(PACKAGE, &class_name));
            assert!(path.exists(), "missing {} for {}", kind, table.name);
        }
    }
}

#[test]
fn test_mapping_bindings_match_normalized_field_names() {
    let opts = options();
    for table in tables() {
        let class_name = opts.class_name(&table.name);
        let xml = read_artifact(&out_dir(), ArtifactKind::Mapping, &class_name);
        let expected: Vec<String> = table.columns.iter().map(|c| to_field_name(&c.name)).collect();

        let properties = bound_properties(&xml);
        assert_eq!(properties, expected, "resultMap of {}", table.name);

        let params = bound_parameters(&xml);
        assert!(!params.is_empty());
        for param in &params {
            assert!(
                expected.contains(param),
                "{} binds unknown field `{}`",
                table.name,
                param
            );
        }
        for column in &table.columns {
            let field = to_field_name(&column.name);
            let tag = TypeMapper::to_binding_type(&column.source_type);
            assert!(
                xml.contains(&format!("#{{{},jdbcType={}}}", field, tag)),
                "{} does not bind {}",
                table.name,
                field
            );
        }
    }
}

#[test]
fn test_entity_fields_match_mapping() {
    let opts = options();
    for table in tables() {
        let class_name = opts.class_name(&table.name);
        let entity = read_artifact(&out_dir(), ArtifactKind::Entity, &class_name);
        assert!(entity.contains(&format!("package {}.entity;", PACKAGE)));
        assert!(entity.contains(&format!("public class {} {{", class_name)));
        for column in &table.columns {
            let java_type = TypeMapper::to_target_type(&column.source_type);
            let field = format!("private {} {};", java_type, to_field_name(&column.name));
            assert!(entity.contains(&field), "{} lacks `{}`", class_name, field);
        }
    }
}

#[test]
fn test_user_artifacts() {
    let entity = read_artifact(&out_dir(), ArtifactKind::Entity, "User");
    assert!(entity.contains("import java.util.Date;"));
    assert!(entity.contains(" * Registered users\n"));
    assert!(entity.contains("     * login name"));
    assert!(entity.contains("private Integer isActive;"));

    let mapper = read_artifact(&out_dir(), ArtifactKind::Declaration, "User");
    assert!(mapper.contains("package com.example.shop.mapper;"));
    assert!(mapper.contains("public interface UserMapper {"));
    assert!(mapper.contains("int deleteByPrimaryKey(Long userId);"));
    assert!(mapper.contains("User selectByPrimaryKey(Long userId);"));
    assert!(mapper.contains("List<User> selectAll();"));

    let xml = read_artifact(&out_dir(), ArtifactKind::Mapping, "User");
    assert!(xml.contains(r#"<mapper namespace="com.example.shop.mapper.UserMapper">"#));
    assert!(xml.contains(r#"<id column="user_id" property="userId" jdbcType="BIGINT" />"#));
    assert!(xml.contains("INSERT INTO t_user ("));
    assert!(xml.contains("WHERE user_id = #{userId,jdbcType=BIGINT}"));
    assert!(xml.contains("created_at = #{createdAt,jdbcType=TIMESTAMP}\n"));
}

#[test]
fn test_order_unknown_type_and_decimal() {
    let entity = read_artifact(&out_dir(), ArtifactKind::Entity, "Order");
    assert!(entity.contains(" * Order entity\n"));
    assert!(entity.contains("import java.math.BigDecimal;"));
    assert!(entity.contains("private BigDecimal totalAmount;"));
    assert!(entity.contains("private Object extraInfo;"));

    let xml = read_artifact(&out_dir(), ArtifactKind::Mapping, "Order");
    assert!(xml.contains("#{extraInfo,jdbcType=OTHER}"));
}

#[test]
fn test_key_fallbacks() {
    // Composite key: first key column
    let mapper = read_artifact(&out_dir(), ArtifactKind::Declaration, "OrderItem");
    assert!(mapper.contains("OrderItem selectByPrimaryKey(Long orderId);"));

    // No key: first column
    let xml = read_artifact(&out_dir(), ArtifactKind::Mapping, "OperationLog");
    assert!(xml.contains(r#"<id column="log_time" property="logTime" jdbcType="TIMESTAMP" />"#));
    assert!(xml.contains("WHERE log_time = #{logTime,jdbcType=TIMESTAMP}"));
}

#[test]
fn test_update_lists_only_non_key_columns() {
    let xml = read_artifact(&out_dir(), ArtifactKind::Mapping, "User");
    let update = xml
        .split("<update id=\"updateByPrimaryKey\"")
        .nth(1)
        .and_then(|rest| rest.split("</update>").next())
        .expect("update statement");
    assert!(!update.contains("user_id = #{userId,jdbcType=BIGINT},"));
    assert!(update.contains("user_name = #{userName,jdbcType=VARCHAR},"));
    // Last assignment carries no trailing comma
    assert!(update.contains("created_at = #{createdAt,jdbcType=TIMESTAMP}\n        WHERE"));
}

// ============================================================================
// Regeneration
// ============================================================================

#[test]
fn test_regeneration_is_byte_identical() {
    let first = tempfile::tempdir().unwrap();
    let second = tempfile::tempdir().unwrap();
    let report = generate_into(first.path());
    generate_into(second.path());

    assert_eq!(report.tables.len(), 4);
    assert_eq!(report.artifacts.len(), 12);
    for path in &report.artifacts {
        let rel = path.strip_prefix(first.path()).unwrap();
        let a = fs::read(path).unwrap();
        let b = fs::read(second.path().join(rel)).unwrap();
        let c = fs::read(out_dir().join(rel)).unwrap();
        assert_eq!(a, b, "{} differs between runs", rel.display());
        assert_eq!(a, c, "{} differs from build output", rel.display());
    }
}

#[test]
fn test_snapshot_input_matches_ddl_input() {
    let dir = tempfile::tempdir().unwrap();
    let snapshot = dir.path().join("schema.json");
    fs::write(&snapshot, serde_json::to_string(&tables()).unwrap()).unwrap();

    let out = dir.path().join("out");
    CodegenBuilder::from_snapshot(&snapshot)
        .output_dir(&out)
        .package_name(PACKAGE)
        .strip_prefixes(&["t_"])
        .generate()
        .unwrap();

    for kind in ArtifactKind::ALL {
        assert_eq!(
            read_artifact(&out, kind, "Order"),
            read_artifact(&out_dir(), kind, "Order")
        );
    }
}

#[test]
fn test_custom_template_and_indent() {
    let dir = tempfile::tempdir().unwrap();
    let templates = dir.path().join("templates");
    fs::create_dir_all(&templates).unwrap();
    fs::write(
        templates.join("entity.hbs"),
        "// {{tableName}}\nclass {{className}} {\n{{#each columns}}\n    {{javaType}} {{fieldName}};\n{{/each}}\n}\n",
    )
    .unwrap();

    let out = dir.path().join("out");
    CodegenBuilder::new(schema_path())
        .output_dir(&out)
        .package_name(PACKAGE)
        .strip_prefixes(&["t_"])
        .template_dir(&templates)
        .indent_size(2)
        .include_tables(&["t_user"])
        .generate()
        .unwrap();

    let entity = read_artifact(&out, ArtifactKind::Entity, "User");
    assert!(entity.starts_with("// t_user\nclass User {\n  Long userId;\n"));

    // Kinds without a custom template still use the built-in one, re-indented
    let mapper = read_artifact(&out, ArtifactKind::Declaration, "User");
    assert!(mapper.contains("\n  int insert(User record);"));
    assert!(!out.join(ArtifactKind::Entity.relative_path(PACKAGE, "Order")).exists());
}

// ============================================================================
// Cross-reference resolution on generated code
// ============================================================================

#[test]
fn test_resolver_pairs_generated_artifacts() {
    let resolver = CrossReferenceResolver::new(out_dir()).unwrap();
    let java = out_dir().join(ArtifactKind::Declaration.relative_path(PACKAGE, "User"));
    let xml = out_dir().join(ArtifactKind::Mapping.relative_path(PACKAGE, "User"));

    assert_eq!(resolver.find_paired_artifact(&java).unwrap(), Some(xml.clone()));
    assert_eq!(resolver.find_paired_artifact(&xml).unwrap(), Some(java.clone()));

    match resolver.resolve(&java, "selectByPrimaryKey").unwrap() {
        Resolution::Found { artifact, position } => {
            assert_eq!(artifact, xml);
            let text = fs::read_to_string(&xml).unwrap();
            assert!(text[position.offset..].starts_with("<select id=\"selectByPrimaryKey\""));
        }
        other => panic!("expected Found, got {:?}", other),
    }

    assert_eq!(
        resolver.resolve(&java, "selectById").unwrap(),
        Resolution::MemberMissing { artifact: xml }
    );
}

#[test]
fn test_generated_declarations_fully_implemented() {
    let resolver = CrossReferenceResolver::new(out_dir()).unwrap();
    for class_name in ["User", "Order", "OrderItem", "OperationLog"] {
        let java = read_artifact(&out_dir(), ArtifactKind::Declaration, class_name);
        let xml = read_artifact(&out_dir(), ArtifactKind::Mapping, class_name);
        let audit = resolver.audit(&java, &xml);
        let names: Vec<&str> = audit.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "insert",
                "deleteByPrimaryKey",
                "updateByPrimaryKey",
                "selectByPrimaryKey",
                "selectAll"
            ]
        );
        assert!(audit.iter().all(|a| a.implemented), "{}", class_name);
    }
}

#[test]
fn test_scaffold_missing_statement() {
    let dir = tempfile::tempdir().unwrap();
    generate_into(dir.path());

    let java = dir.path().join(ArtifactKind::Declaration.relative_path(PACKAGE, "User"));
    let xml = dir.path().join(ArtifactKind::Mapping.relative_path(PACKAGE, "User"));

    // Declare a new method by hand
    let declaration = fs::read_to_string(&java).unwrap().replace(
        "List<User> selectAll();",
        "List<User> selectAll();\n\n    User selectByEmail(String email);",
    );
    fs::write(&java, declaration).unwrap();

    let resolver = CrossReferenceResolver::new(dir.path()).unwrap();
    assert!(matches!(
        resolver.resolve(&java, "selectByEmail").unwrap(),
        Resolution::MemberMissing { .. }
    ));

    let before = fs::read_to_string(&xml).unwrap();
    let syntax = resolver.syntax(batis_codegen::xref::ArtifactRole::Mapping);
    let scaffold = scaffold_file(syntax, &xml, "selectByEmail").unwrap();
    assert!(matches!(scaffold, Scaffold::Inserted { .. }));

    let after = fs::read_to_string(&xml).unwrap();
    assert!(after.len() > before.len());
    assert!(after.ends_with("    </select>\n</mapper>\n"));
    assert!(matches!(
        resolver.resolve(&java, "selectByEmail").unwrap(),
        Resolution::Found { .. }
    ));

    // A second scaffold leaves the file alone
    let again = scaffold_file(syntax, &xml, "selectByEmail").unwrap();
    assert!(matches!(again, Scaffold::AlreadyPresent { .. }));
    assert_eq!(fs::read_to_string(&xml).unwrap(), after);
}
