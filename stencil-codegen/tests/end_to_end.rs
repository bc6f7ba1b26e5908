use std::fs;
use std::path::{Path, PathBuf};
use stencil_codegen::{
    CodegenError, FileOutputWriter, Generator, GeneratorConfig, StreamOutputWriter,
};
use stencil_universe::{Universe, parse_universe, validate_universe};

struct Workspace {
    _dir: tempfile::TempDir,
    root: PathBuf,
}

impl Workspace {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().to_path_buf();
        fs::create_dir_all(root.join("gen")).unwrap();
        fs::create_dir_all(root.join("app")).unwrap();

        fs::write(
            root.join("gen").join("Sorter.tmpl"),
            r#"{{add_import "sort"}}func (x {{type_string (pointer_to target)}}) Sort{{default_arg "by" "ID"}}() {
	sort.Slice(x.{{require_arg "field"}}, nil)
}"#,
        )
        .unwrap();
        fs::write(
            root.join("gen").join("Lister.tmpl"),
            r#"{{#each (fields target)}}{{add_import_type type}}{{/each}}// {{target_name}} fields:{{#each (fields target)}} {{name}}{{/each}}"#,
        )
        .unwrap();
        fs::write(
            root.join("gen").join("Bundle.tmpl"),
            r#"// bundle {{arg "field"}} for {{target_name}}"#,
        )
        .unwrap();
        fs::write(
            root.join("gen").join("Generic.tmpl"),
            r#"{{add_import "never"}}{{#each (fields target)}}{{add_import_type type}}{{/each}}"#,
        )
        .unwrap();

        Self { _dir: dir, root }
    }

    fn file(&self, rel: &str) -> PathBuf {
        self.root.join(rel)
    }

    fn universe(&self) -> Universe {
        let xml = format!(
            r#"<universe>
    <package path="example.com/gen" name="gen" dir="{root}/gen">
        <file path="{root}/gen/gen.go"/>
        <type name="Sorter" line="3"><struct/></type>
        <type name="Lister" line="4"><struct/></type>
        <type name="Generic" line="5"><struct/></type>
        <type name="Bundle" line="6">
            <struct>
                <field name="Sorter" embedded="true" tag="codegen:&quot;by=Name&quot;"><named package="example.com/gen" name="Sorter"/></field>
                <field name="Lister" embedded="true" tag="codegen:&quot;&quot;"><named package="example.com/gen" name="Lister"/></field>
            </struct>
        </type>
    </package>
    <package path="example.com/app" name="app" dir="{root}/app">
        <file path="{root}/app/models.go"/>
        <file path="{root}/app/plain.go"/>
        <file path="{root}/app/generic.go"/>
        <type name="Order" file="{root}/app/models.go" line="10">
            <struct>
                <field name="ID"><basic name="int"/></field>
                <field name="Items"><slice><named package="example.com/app" name="Item"/></slice></field>
                <field name="Created"><named package="time" name="Time"/></field>
                <field name="bundle" tag="codegen:&quot;field=Items&quot;"><named package="example.com/gen" name="Bundle"/></field>
                <field name="again" tag="codegen:&quot;field=Items&quot;"><named package="example.com/gen" name="Bundle"/></field>
            </struct>
        </type>
        <type name="Item" file="{root}/app/models.go" line="3">
            <struct>
                <field name="Name"><basic name="string"/></field>
            </struct>
        </type>
        <type name="Note" file="{root}/app/plain.go" line="3">
            <struct>
                <field name="Text" tag="json:&quot;text&quot;"><basic name="string"/></field>
            </struct>
        </type>
        <type name="Box" file="{root}/app/generic.go" line="3">
            <struct>
                <field name="Value"><typeparam name="T"/></field>
                <field name="g" tag="codegen:&quot;&quot;"><named package="example.com/gen" name="Generic"/></field>
            </struct>
        </type>
    </package>
</universe>"#,
            root = self.root.display()
        );
        let universe = parse_universe(&xml).expect("Failed to parse");
        validate_universe(&universe).expect("Failed to validate");
        universe
    }
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).expect("Failed to read output")
}

#[test]
fn test_generates_file_with_nested_directives() {
    let ws = Workspace::new();
    let universe = ws.universe();
    let mut generator = Generator::new(&universe, GeneratorConfig::default());
    let mut writer = FileOutputWriter::new();

    let written = generator
        .process_file(&ws.file("app/models.go"), &mut writer)
        .expect("Failed to generate");
    assert_eq!(written, ws.file("app/models_generated.go"));

    let expected = "// Code generated by stencil. DO NOT EDIT.

package app

import (
\t\"sort\"
\t\"time\"
\t\"example.com/gen\"
)

// bundle Items for Order

func (x *Order) SortName() {
\tsort.Slice(x.Items, nil)
}

// Order fields: ID Items Created bundle again
";
    assert_eq!(read(&written), expected);
}

#[test]
fn test_template_cache_outlives_sessions() {
    let ws = Workspace::new();
    let universe = ws.universe();
    let mut generator = Generator::new(&universe, GeneratorConfig::default());

    generator
        .generate_file(&ws.file("app/models.go"))
        .expect("Failed to generate");
    assert_eq!(generator.locator().len(), 3);

    fs::remove_file(ws.file("gen/Sorter.tmpl")).unwrap();
    let again = generator
        .generate_file(&ws.file("app/models.go"))
        .expect("Cached template should be reused");
    assert_eq!(again.fragments.len(), 3);
}

#[test]
fn test_file_without_directives() {
    let ws = Workspace::new();
    let universe = ws.universe();
    let mut generator = Generator::new(&universe, GeneratorConfig::default());

    let err = generator
        .generate_file(&ws.file("app/plain.go"))
        .expect_err("plain file has no directives");
    assert!(matches!(err, CodegenError::NoDirectivesFound { .. }));
}

#[test]
fn test_unsupported_shape_fails_only_its_file() {
    let ws = Workspace::new();
    let universe = ws.universe();
    let mut generator = Generator::new(&universe, GeneratorConfig::default());
    let mut writer = FileOutputWriter::new();

    let files = [
        ws.file("app/generic.go"),
        ws.file("app/plain.go"),
        ws.file("app/models.go"),
    ];
    let report = generator.process_files(&files[..], &mut writer);

    assert!(!report.is_success());
    assert_eq!(report.failed.len(), 2);
    assert!(matches!(
        report.failed[0].1.root_cause(),
        CodegenError::UnsupportedTypeShape { .. }
    ));
    assert_eq!(report.written.len(), 1);
    assert!(!ws.file("app/generic_generated.go").exists());

    let models = read(&ws.file("app/models_generated.go"));
    assert!(!models.contains("never"));
}

#[test]
fn test_unresolved_file() {
    let ws = Workspace::new();
    let universe = ws.universe();
    let mut generator = Generator::new(&universe, GeneratorConfig::default());

    let err = generator
        .generate_file(&ws.file("app/unknown.go"))
        .expect_err("file is not part of any package");
    assert!(matches!(
        err,
        CodegenError::Universe(stencil_universe::UniverseError::UnresolvedFile { .. })
    ));
}

#[test]
fn test_custom_suffix_and_stream_writer() {
    let ws = Workspace::new();
    let universe = ws.universe();
    let config = GeneratorConfig::default().with_output_suffix("_gen");
    let mut generator = Generator::new(&universe, config);
    let mut writer = StreamOutputWriter::new(Vec::new());

    let path = generator
        .process_file(&ws.file("app/models.go"), &mut writer)
        .expect("Failed to generate");
    assert_eq!(path, ws.file("app/models_gen.go"));
    assert!(!path.exists());

    let text = String::from_utf8(writer.into_inner()).unwrap();
    assert!(text.contains("func (x *Order) SortName()"));
}
