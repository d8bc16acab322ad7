//! Compile command synthesis.
//!
//! One argument string per (compile group, source) pair, assembled from the
//! group's raw command fragments, include directories, and preprocessor
//! defines, in that category order.

use crate::codemodel::CompileGroup;
use crate::toolchain::CompilerInfo;
use std::path::PathBuf;

/// Formatting options for synthesized commands.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommandOptions {
    /// Emit include directories with the `/external:I` form. Only honored
    /// for compilers that support it; older versions fall back to `/I`.
    pub external_includes: bool,
}

/// One reconstructed compiler invocation. Ephemeral: produced per iteration
/// step and never cached.
#[derive(Debug)]
pub struct CompileCommand<'a> {
    /// Absolute path of the source file.
    pub source: PathBuf,
    /// Fully assembled, escaped command-line string.
    pub arguments: String,
    /// The compiler resolved for the group's language.
    pub compiler: &'a CompilerInfo,
}

/// Quote an argument for the MSVC command line.
///
/// The argument is wrapped in double quotes. A trailing path separator would
/// escape the closing quote, so every separator in the trailing run is
/// doubled: an argument ending in `k` separators ends up with `2k` of them
/// before the closing quote.
pub fn escape_argument(arg: &str) -> String {
    let trailing = arg
        .bytes()
        .rev()
        .take_while(|b| *b == b'\\' || *b == b'/')
        .count();

    let mut out = String::with_capacity(arg.len() + trailing + 2);
    out.push('"');
    out.push_str(arg);
    out.push_str(&arg[arg.len() - trailing..]);
    out.push('"');
    out
}

/// Synthesize the argument sequence for one compile group: fragments
/// verbatim, then one include argument per directory, then one define
/// argument per define. Relative order within each category is preserved.
pub fn synthesize_arguments(
    group: &CompileGroup,
    compiler: &CompilerInfo,
    options: CommandOptions,
) -> Vec<String> {
    let include_flag = if options.external_includes && compiler.supports_external_includes() {
        "/external:I"
    } else {
        "/I"
    };

    let mut args =
        Vec::with_capacity(group.fragments.len() + group.includes.len() + group.defines.len());
    for fragment in &group.fragments {
        args.push(fragment.fragment.clone());
    }
    for include in &group.includes {
        args.push(escape_argument(&format!(
            "{}{}",
            include_flag,
            include.path.display()
        )));
    }
    for define in &group.defines {
        args.push(escape_argument(&format!("/D{}", define.define)));
    }
    args
}

/// Join a synthesized argument sequence into the final command-line string.
pub fn join_arguments(args: &[String]) -> String {
    args.concat()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::toolchain::CompilerInfo;

    fn msvc(version: &str) -> CompilerInfo {
        CompilerInfo {
            path: PathBuf::from("cl.exe"),
            version: version.to_string(),
            includes: vec![],
        }
    }

    fn group(fragments: &[&str], includes: &[&str], defines: &[&str]) -> CompileGroup {
        let json = serde_json::json!({
            "language": "CXX",
            "compileCommandFragments": fragments
                .iter()
                .map(|f| serde_json::json!({ "fragment": f }))
                .collect::<Vec<_>>(),
            "includes": includes
                .iter()
                .map(|i| serde_json::json!({ "path": i }))
                .collect::<Vec<_>>(),
            "defines": defines
                .iter()
                .map(|d| serde_json::json!({ "define": d }))
                .collect::<Vec<_>>(),
            "sourceIndexes": [0]
        });
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_escape_plain() {
        assert_eq!(escape_argument("/DDEBUG"), "\"/DDEBUG\"");
    }

    #[test]
    fn test_escape_doubles_trailing_separators() {
        assert_eq!(escape_argument("C:\\dir\\"), "\"C:\\dir\\\\\"");
        assert_eq!(escape_argument("C:\\dir\\\\"), "\"C:\\dir\\\\\\\\\"");
        assert_eq!(escape_argument("C:\\dir\\\\\\"), "\"C:\\dir\\\\\\\\\\\\\"");
        assert_eq!(escape_argument("inc/"), "\"inc//\"");
    }

    #[test]
    fn test_escape_degenerate_arguments() {
        assert_eq!(escape_argument(""), "\"\"");
        assert_eq!(escape_argument("\\"), "\"\\\\\"");
        assert_eq!(escape_argument("/"), "\"//\"");
    }

    #[test]
    fn test_escape_interior_separators_untouched() {
        assert_eq!(escape_argument("C:\\a\\b.cpp"), "\"C:\\a\\b.cpp\"");
    }

    #[test]
    fn test_escape_idempotent_without_trailing_separator() {
        let once = escape_argument("/IC:/proj/inc");
        let twice = escape_argument(&once);
        assert_eq!(twice, format!("\"{}\"", once));
    }

    #[test]
    fn test_synthesis_order_and_count() {
        let group = group(
            &["/W4", "/O2"],
            &["C:/inc/a", "C:/inc/b"],
            &["DEBUG", "UNICODE"],
        );
        let args = synthesize_arguments(&group, &msvc("19.29.30133"), CommandOptions::default());

        assert_eq!(args.len(), 2 + 2 + 2);
        assert_eq!(args[0], "/W4");
        assert_eq!(args[1], "/O2");
        assert_eq!(args[2], "\"/IC:/inc/a\"");
        assert_eq!(args[3], "\"/IC:/inc/b\"");
        assert_eq!(args[4], "\"/DDEBUG\"");
        assert_eq!(args[5], "\"/DUNICODE\"");
    }

    #[test]
    fn test_synthesis_matches_expected_command_line() {
        let group = group(&["/W4"], &["C:/proj/inc"], &["DEBUG"]);
        let args = synthesize_arguments(&group, &msvc("19.29.30133"), CommandOptions::default());
        insta::assert_snapshot!(join_arguments(&args), @r#"/W4"/IC:/proj/inc""/DDEBUG""#);
    }

    #[test]
    fn test_external_includes_when_supported() {
        let group = group(&[], &["C:/sdk/inc"], &[]);
        let options = CommandOptions {
            external_includes: true,
        };

        let args = synthesize_arguments(&group, &msvc("19.29.30133"), options);
        assert_eq!(args, vec!["\"/external:IC:/sdk/inc\""]);

        // Older compilers silently keep the ordinary form.
        let args = synthesize_arguments(&group, &msvc("19.16.27023"), options);
        assert_eq!(args, vec!["\"/IC:/sdk/inc\""]);
    }
}
