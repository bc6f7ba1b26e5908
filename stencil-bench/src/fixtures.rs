//! Synthetic universes and template directories for benchmarks.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use stencil_universe::{Universe, parse_universe};
use tempfile::TempDir;

const ACCESSORS_TEMPLATE: &str = r#"{{#each (fields target)}}{{#if (is_exported name)}}{{add_import_type type}}func (x {{type_string (pointer_to @root.target)}}) {{arg "prefix"}}{{name}}() {{type_string type}} { return x.{{name}} }
{{/if}}{{/each}}"#;

const BUNDLE_TEMPLATE: &str = r#"// {{target_name}} generated with scope {{arg "scope"}}"#;

const DESCRIBE_TEMPLATE: &str =
    r#"func (x {{target_name}}) Describe() string { return "{{package.name}}.{{target_name}}" }"#;

/// A universe whose generator templates live in a temporary directory.
pub struct Fixture {
    _dir: TempDir,
    /// Loaded universe.
    pub universe: Universe,
    /// Source files carrying directives, in declaration order.
    pub files: Vec<PathBuf>,
    /// Universe document the universe was parsed from.
    pub xml: String,
}

impl Fixture {
    /// Creates a fixture with `files` source files of `types_per_file`
    /// directive-carrying structs each.
    ///
    /// # Errors
    /// Returns an error if the templates cannot be written or the generated
    /// universe fails to parse.
    pub fn new(files: usize, types_per_file: usize) -> Result<Self, Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let gen_dir = dir.path().join("gen");
        let app_dir = dir.path().join("app");
        fs::create_dir_all(&gen_dir)?;
        fs::create_dir_all(&app_dir)?;
        fs::write(gen_dir.join("Accessors.tmpl"), ACCESSORS_TEMPLATE)?;
        fs::write(gen_dir.join("Describe.tmpl"), DESCRIBE_TEMPLATE)?;
        fs::write(gen_dir.join("Bundle.tmpl"), BUNDLE_TEMPLATE)?;

        let xml = universe_xml(dir.path(), files, types_per_file);
        let universe = parse_universe(&xml)?;
        let files = (0..files)
            .map(|i| app_dir.join(format!("file_{i}.go")))
            .collect();

        Ok(Self {
            _dir: dir,
            universe,
            files,
            xml,
        })
    }
}

/// Builds a universe document rooted at `root`.
///
/// Package `example.com/gen` declares the `Accessors` and `Describe`
/// generators and a `Bundle` struct nesting both. Package `example.com/app`
/// declares `types_per_file` structs in each of `files` files, each carrying
/// a `Bundle` directive.
#[must_use]
pub fn universe_xml(root: &Path, files: usize, types_per_file: usize) -> String {
    let root = root.display();
    let mut xml = String::new();
    let _ = write!(
        xml,
        r#"<universe>
    <package path="example.com/gen" name="gen" dir="{root}/gen">
        <file path="{root}/gen/gen.go"/>
        <type name="Accessors" line="3"><struct/></type>
        <type name="Describe" line="4"><struct/></type>
        <type name="Bundle" line="5">
            <struct>
                <field name="Accessors" embedded="true" tag="codegen:&quot;prefix=Get&quot;"><named package="example.com/gen" name="Accessors"/></field>
                <field name="Describe" embedded="true" tag="codegen:&quot;&quot;"><named package="example.com/gen" name="Describe"/></field>
            </struct>
        </type>
    </package>
    <package path="example.com/app" name="app" dir="{root}/app">
"#
    );

    for f in 0..files {
        let _ = writeln!(xml, r#"        <file path="{root}/app/file_{f}.go"/>"#);
    }

    for f in 0..files {
        for t in 0..types_per_file {
            let name = format!("T{f}x{t}");
            let parent = if t == 0 {
                name.clone()
            } else {
                format!("T{f}x{}", t - 1)
            };
            let _ = write!(
                xml,
                r#"        <type name="{name}" file="{root}/app/file_{f}.go" line="{line}">
            <struct>
                <field name="ID"><basic name="int64"/></field>
                <field name="Name"><basic name="string"/></field>
                <field name="Tags"><slice><basic name="string"/></slice></field>
                <field name="Created"><named package="time" name="Time"/></field>
                <field name="Parent"><pointer><named package="example.com/app" name="{parent}"/></pointer></field>
                <field name="Index"><map><basic name="string"/><slice><named package="bytes" name="Buffer"/></slice></map></field>
                <field name="gen" tag="json:&quot;-&quot; codegen:&quot;scope={name}&quot;"><named package="example.com/gen" name="Bundle"/></field>
            </struct>
        </type>
"#,
                line = 3 + t * 10,
            );
        }
    }

    xml.push_str("    </package>\n</universe>\n");
    xml
}
