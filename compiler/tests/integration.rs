use std::fs;
use std::path::Path;

use tempfile::TempDir;

fn parse(source: &str) -> bdash::Document {
    bdash::parser::Parser::new(source.to_string(), 0)
        .parse()
        .expect("parse failed")
}

fn parse_errors(source: &str) -> Vec<bdash::parser::ParseError> {
    bdash::parser::Parser::new(source.to_string(), 0)
        .parse()
        .err()
        .expect("expected parse errors")
}

fn compile(source: &str, root: &Path) -> Result<String, compiler::DiagnosticError> {
    compiler::compile(&parse(source), root)
}

fn compile_ok(source: &str, root: &Path) -> String {
    compile(source, root).expect("compile failed")
}

fn write_module(root: &Path, name: &str, content: &str) {
    fs::write(root.join(name), content).expect("cannot write module");
}

/// 1-based line of a byte offset in source.
fn line_of(source: &str, offset: usize) -> usize {
    source[..offset].chars().filter(|c| *c == '\n').count() + 1
}

#[test]
fn prose_only_document() {
    let root = TempDir::new().unwrap();
    let output = compile_ok("# Title\n\nSome text.\n", root.path());

    assert!(output.contains("from dash import Dash, dcc, html"));
    assert_eq!(output.matches("dcc.Markdown(").count(), 1);
    assert!(output.contains("# Title"));
    // No application imports beyond the framework line.
    assert!(!output.contains("\nimport "));
}

#[test]
fn empty_document() {
    let root = TempDir::new().unwrap();
    let output = compile_ok("", root.path());
    assert!(output.contains("app.layout = html.Div("));
    assert!(output.contains("app.run(debug=True)"));
}

#[test]
fn scenario_counter_golden() {
    let root = TempDir::new().unwrap();
    write_module(
        root.path(),
        "counter.py",
        "from dash import html\n\nlayout = html.Div(\"x\")\n",
    );

    let source = "# T\n\ntext\n\n```{.dash app=counter.py}\n```\n\nmore";
    let output = compile_ok(source, root.path());

    let expected = r#"from dash import Dash, dcc, html

app = Dash(__name__)

app.layout = html.Div(
    [
        dcc.Markdown(children="""
# T

text"""),
        html.Div(children='x'),
        dcc.Markdown(children="""
more"""),
    ]
)

if __name__ == "__main__":
    app.run(debug=True)
"#;
    assert_eq!(output, expected);
}

#[test]
fn order_preservation() {
    let root = TempDir::new().unwrap();
    write_module(root.path(), "a.py", "from dash import html\nlayout = html.Div(\"alpha\")\n");
    write_module(root.path(), "b.py", "from dash import html\nlayout = html.Div(\"beta\")\n");

    let source = "intro\n\n```{.dash app=a.py}\n```\n\nmiddle\n\n```{.dash app=b.py}\n```\n\noutro\n";
    let output = compile_ok(source, root.path());

    let intro = output.find("intro").expect("intro missing");
    let alpha = output.find("'alpha'").expect("alpha missing");
    let middle = output.find("middle").expect("middle missing");
    let beta = output.find("'beta'").expect("beta missing");
    let outro = output.find("outro").expect("outro missing");
    assert!(intro < alpha && alpha < middle && middle < beta && beta < outro);
    assert_eq!(output.matches("dcc.Markdown(").count(), 3);
}

#[test]
fn determinism() {
    let root = TempDir::new().unwrap();
    write_module(root.path(), "a.py", "from dash import html\nlayout = html.Div(\"alpha\")\n");

    let source = "one\n\n```{.dash app=a.py}\n```\n\ntwo\n";
    let first = compile_ok(source, root.path());
    let second = compile_ok(source, root.path());
    assert_eq!(first, second);
}

#[test]
fn same_module_twice_embeds_twice() {
    let root = TempDir::new().unwrap();
    write_module(root.path(), "a.py", "from dash import html\nlayout = html.Div(\"alpha\")\n");

    let source = "```{.dash app=a.py}\n```\n\nbetween\n\n```{.dash app=a.py}\n```\n";
    let output = compile_ok(source, root.path());
    assert_eq!(output.matches("'alpha'").count(), 2);
}

#[test]
fn dash_block_without_app_falls_back_to_prose() {
    let root = TempDir::new().unwrap();
    let source = "before\n\n```{.dash}\nx = 1\n```\n\nafter\n";
    let output = compile_ok(source, root.path());

    // The block stays verbatim inside the surrounding Markdown prose.
    assert!(output.contains("```{.dash}"));
    assert_eq!(output.matches("dcc.Markdown(").count(), 1);
}

#[test]
fn unrelated_fence_conventions_stay_prose() {
    let root = TempDir::new().unwrap();
    // An Rmd-style chunk would be an attribute error, but it isn't dash-marked.
    let source = "text\n\n```{r, echo=FALSE}\nplot(x)\n```\n\n```python\nprint(1)\n```\n";
    let output = compile_ok(source, root.path());
    assert!(output.contains("plot(x)"));
    assert!(output.contains("print(1)"));
}

#[test]
fn fence_nested_in_list_is_prose() {
    let root = TempDir::new().unwrap();
    // a.py does not exist; the nested fence must not be resolved.
    let source = "- item\n\n  ```{.dash app=a.py}\n  ```\n";
    assert!(compile(source, root.path()).is_ok());
}

#[test]
fn module_not_found_reports_reference_and_line() {
    let root = TempDir::new().unwrap();
    let source = "# hi\n\n```{.dash app=missing.py}\n```\n";
    let error = compile(source, root.path()).err().expect("expected error");

    assert!(error.to_string().contains("missing.py"));
    let span = error.span.as_ref().expect("error has no span");
    assert_eq!(line_of(source, span.start), 3);
}

#[test]
fn app_layout_takes_precedence_over_bare_layout() {
    let root = TempDir::new().unwrap();
    write_module(
        root.path(),
        "both.py",
        "from dash import Dash, html\n\napp = Dash(__name__)\napp.layout = html.Div(\"from app\")\nlayout = html.Div(\"bare\")\n",
    );

    let output = compile_ok("```{.dash app=both.py}\n```\n", root.path());
    assert!(output.contains("'from app'"));
    assert!(!output.contains("'bare'"));
}

#[test]
fn app_instance_without_layout_falls_back_to_bare_layout() {
    let root = TempDir::new().unwrap();
    write_module(
        root.path(),
        "partial.py",
        "from dash import Dash, html\n\napp = Dash(__name__)\nlayout = html.Div(\"bare\")\n",
    );

    let output = compile_ok("```{.dash app=partial.py}\n```\n", root.path());
    assert!(output.contains("'bare'"));
}

#[test]
fn missing_contract_is_fatal() {
    let root = TempDir::new().unwrap();
    write_module(root.path(), "empty.py", "x = 1\n");

    let error = compile("```{.dash app=empty.py}\n```\n", root.path())
        .err()
        .expect("expected error");
    assert!(error.to_string().contains("neither"));
}

#[test]
fn reference_escaping_the_root_is_rejected() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("root");
    fs::create_dir(&root).unwrap();
    write_module(dir.path(), "evil.py", "from dash import html\nlayout = html.Div(\"e\")\n");

    let error = compile("```{.dash app=../evil.py}\n```\n", &root)
        .err()
        .expect("expected error");
    assert!(error.to_string().contains("escapes"));
}

#[test]
fn empty_attribute_value_is_fatal() {
    let errors = parse_errors("```{.dash app=}\n```\n");
    assert!(errors[0].message.contains("empty value"));
}

#[test]
fn bare_attribute_token_is_fatal() {
    let errors = parse_errors("```{.dash app=a.py stray}\n```\n");
    assert!(errors[0].message.contains("invalid attribute token"));
}

#[test]
fn unterminated_tagged_fence_is_fatal() {
    let errors = parse_errors("text\n\n```{.dash app=x.py}\nnever closed");
    assert!(errors[0].message.contains("unterminated"));
}

#[test]
fn missing_closing_brace_is_fatal() {
    let errors = parse_errors("```{.dash app=x.py\n```\n");
    assert!(errors[0].message.contains("closing '}'"));
}

#[test]
fn module_ids_are_namespaced_by_file_stem() {
    let root = TempDir::new().unwrap();
    write_module(
        root.path(),
        "counter.py",
        "from dash import html\n\nlayout = html.Div([html.Button(\"go\", id=\"btn\"), html.Div(id=\"out\")])\n",
    );

    let output = compile_ok("```{.dash app=counter.py}\n```\n", root.path());
    assert!(output.contains("id='counter_btn'"));
    assert!(output.contains("id='counter_out'"));
}

#[test]
fn block_attributes_become_a_wrapper_div() {
    let root = TempDir::new().unwrap();
    write_module(
        root.path(),
        "counter.py",
        "from dash import html\nlayout = html.Div([html.Div(id=\"x\")])\n",
    );

    let output = compile_ok("```{.dash app=counter.py #main .wide}\n```\n", root.path());
    assert!(output.contains("className='wide', id='main'"));
    // The wrapper id comes from the document, not the module: unprefixed.
    assert!(output.contains("id='counter_x'"));
    assert!(!output.contains("counter_main"));
}

#[test]
fn module_bindings_and_multiline_calls() {
    let root = TempDir::new().unwrap();
    write_module(
        root.path(),
        "stats.py",
        "from dash import html, dcc\n\nheader = html.H1(\"Stats\")\nlayout = html.Div(\n    [\n        header,\n        dcc.Graph(id=\"plot\"),\n    ],\n)\n",
    );

    let output = compile_ok("```{.dash app=stats.py}\n```\n", root.path());
    assert!(output.contains("html.H1(children='Stats')"));
    assert!(output.contains("dcc.Graph(id='stats_plot')"));
}

#[test]
fn prop_literals_render_as_python() {
    let root = TempDir::new().unwrap();
    write_module(
        root.path(),
        "slider.py",
        "from dash import dcc\n\nlayout = dcc.Slider(min=0, max=10, value=2.5, marks=None, vertical=False)\n",
    );

    let output = compile_ok("```{.dash app=slider.py}\n```\n", root.path());
    assert!(
        output.contains("dcc.Slider(marks=None, max=10, min=0, value=2.5, vertical=False)")
    );
}

#[test]
fn unsupported_module_statement_is_reported_with_line() {
    let root = TempDir::new().unwrap();
    write_module(
        root.path(),
        "cb.py",
        "from dash import html\n\ndef update(n):\n    return n\n",
    );

    let error = compile("```{.dash app=cb.py}\n```\n", root.path())
        .err()
        .expect("expected error");
    assert!(error.to_string().contains("line 3"));
}

#[test]
fn options_shape_the_generated_program() {
    let root = TempDir::new().unwrap();
    write_module(root.path(), "a.py", "from dash import html\nlayout = html.Div(\"alpha\")\n");

    let options = compiler::Options {
        indent: "  ".to_string(),
        markdown_class: Some("dash-markdown".to_string()),
        layout_class: Some("dash-layout".to_string()),
        precode: Some("import os".to_string()),
    };
    let document = parse("hello\n\n```{.dash app=a.py}\n```\n");
    let output = compiler::compile_with_options(&document, root.path(), &options)
        .expect("compile failed");

    assert!(output.contains("import os\n\napp = Dash(__name__)"));
    assert!(output.contains("\n  [\n"));
    assert!(output.contains("className='dash-markdown'"));
    // No id or extra classes on the block, but a configured layout class
    // still forces the wrapper.
    assert!(output.contains("className='dash-layout'"));
}

#[test]
fn fence_body_is_ignored() {
    let root = TempDir::new().unwrap();
    write_module(root.path(), "a.py", "from dash import html\nlayout = html.Div(\"alpha\")\n");

    let with_body = "```{.dash app=a.py}\nanything at all\n```\n";
    let without_body = "```{.dash app=a.py}\n```\n";
    assert_eq!(
        compile_ok(with_body, root.path()),
        compile_ok(without_body, root.path())
    );
}
