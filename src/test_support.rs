//! Definition folders for unit tests

use std::fs;
use std::path::Path;

use tempfile::TempDir;

/// Keywords, numbers, strings ending at the line end, line and block comments
pub const JS_SYNTAX: &str = r#"%YAML 1.2
---
name: JavaScript
file_extensions: [js]
scope: source.js
contexts:
  main:
    - match: '//.*$\n?'
      scope: comment.line.double-slash.js
    - match: '/\*'
      push: block_comment
    - match: '"'
      push: double_string
    - match: '\b(let|const|var)\b'
      scope: keyword.other.js
    - match: '\b[0-9]+\b'
      scope: constant.numeric.js
  block_comment:
    - meta_scope: comment.block.js
    - match: '\*/'
      pop: true
  double_string:
    - meta_scope: string.quoted.double.js
    - match: '\\.'
      scope: constant.character.escape.js
    - match: '"'
      pop: true
    - match: '\n'
      pop: true
"#;

/// A theme rule: scope selector, foreground, font style
pub type Rule<'a> = (&'a str, &'a str, &'a str);

/// tmTheme plist with global colors and `rules`
pub fn tm_theme(name: &str, background: &str, foreground: &str, rules: &[Rule<'_>]) -> String {
    let rules: String = rules
        .iter()
        .map(|(scope, fg, font)| {
            format!(
                "<dict><key>scope</key><string>{scope}</string>\
                 <key>settings</key><dict>\
                 <key>foreground</key><string>{fg}</string>\
                 <key>fontStyle</key><string>{font}</string>\
                 </dict></dict>\n"
            )
        })
        .collect();

    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<dict>
<key>name</key><string>{name}</string>
<key>settings</key>
<array>
<dict><key>settings</key><dict>
<key>background</key><string>{background}</string>
<key>foreground</key><string>{foreground}</string>
</dict></dict>
{rules}</array>
</dict>
</plist>
"#
    )
}

pub const KEYWORD: &str = "#0000ff";
pub const STRING: &str = "#008000";
pub const COMMENT: &str = "#808080";

pub fn light_theme() -> String {
    tm_theme(
        "Dash (light)",
        "#ffffff",
        "#000000",
        &[
            ("keyword", KEYWORD, "bold"),
            ("string", STRING, ""),
            ("comment", COMMENT, "italic"),
            ("constant.numeric", "#aa00aa", ""),
        ],
    )
}

pub fn dark_theme() -> String {
    tm_theme(
        "Dash",
        "#1e1e1e",
        "#d4d4d4",
        &[
            ("keyword", "#569cd6", "bold"),
            ("string", "#ce9178", ""),
            ("comment", "#6a9955", "italic"),
            ("constant.numeric", "#b5cea8", ""),
        ],
    )
}

/// Write `files` (relative path, content) into a fresh temporary folder
pub fn folder(files: &[(&str, &str)]) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    for (name, content) in files {
        write(dir.path(), name, content);
    }
    dir
}

/// JavaScript syntax plus the light and dark test themes
pub fn js_folder() -> TempDir {
    folder(&[
        ("JavaScript.sublime-syntax", JS_SYNTAX),
        ("themes/Dash (light).tmTheme", &light_theme()),
        ("themes/Dash.tmTheme", &dark_theme()),
    ])
}

pub fn write(dir: &Path, name: &str, content: &str) {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}
