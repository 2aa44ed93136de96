//! Build script generating the DAO trees this crate compiles.
//!
//! Every tree is the same `vertx` schema generated with different
//! switches, mounted at `crate::<tree>::vertx::tables`.

use daogen_codegen::{FileSink, GeneratorDriver, SchemaDescriptor, TableDescriptor};
use daogen_config::{GeneratorConfig, OutputConfig};
use std::env;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

fn trees() -> [(&'static str, GeneratorConfig); 3] {
    [
        ("annotated", GeneratorConfig::default()),
        (
            "unannotated",
            GeneratorConfig {
                generate_injection_annotations: false,
                generate_interface_binding: false,
                ..GeneratorConfig::default()
            },
        ),
        (
            "moduleless",
            GeneratorConfig {
                generate_module: false,
                ..GeneratorConfig::default()
            },
        ),
    ]
}

fn schema() -> SchemaDescriptor {
    SchemaDescriptor::new("vertx")
        .with_table(
            TableDescriptor::new("something")
                .column("someid", "i32", false)
                .column("somestring", "String", true)
                .column("somehugenumber", "i64", true)
                .primary_key(["someid"]),
        )
        .with_table(
            TableDescriptor::new("somethingcomposite")
                .column("someid", "i32", false)
                .column("somesecondid", "i32", false)
                .column("somejsonobject", "String", true)
                .primary_key(["someid", "somesecondid"]),
        )
        .with_table(
            TableDescriptor::new("audit_log")
                .column("message", "String", true)
                .column("logged_at", "i64", true),
        )
}

fn mount(out: &mut String, name: &str, file: &Path) -> std::fmt::Result {
    writeln!(out, "#[path = {:?}]", file.display().to_string())?;
    writeln!(out, "pub mod {name};")
}

fn main() -> anyhow::Result<()> {
    let out_dir = PathBuf::from(env::var("OUT_DIR")?);
    let schema = schema();

    for (tree, config) in trees() {
        let root = out_dir.join(tree);
        let output = OutputConfig {
            target_dir: root.clone(),
            root_module: format!("crate::{tree}"),
            runtime_crate: "daogen_runtime".to_string(),
        };
        let report = GeneratorDriver::from_config(config, &output).run(&schema, &mut FileSink::new(&root))?;

        let tables = root.join("vertx").join("tables");
        let mut mounts = String::new();
        mount(&mut mounts, "daos", &tables.join("daos").join("mod.rs"))?;
        if report.module.is_some() {
            mount(&mut mounts, "modules", &tables.join("modules").join("mod.rs"))?;
        }
        fs::write(out_dir.join(format!("{tree}_tables.rs")), mounts)?;
    }

    println!("cargo:rerun-if-changed=build.rs");
    Ok(())
}
