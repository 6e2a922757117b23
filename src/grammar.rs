//! Grammar tables for the highlighter.
//!
//! A grammar is an ORDERED list of `(category, pattern, flags)` rules. Order
//! is the precedence: a rule only sees text that no earlier rule claimed, so
//! `##` doc comments must come before `#` comments, strings before keywords,
//! and so on. The tables are plain `&[Rule]` arrays for that reason.
//!
//! ## Rule flags
//!
//! - `lookbehind`: the first capture group is context that must precede the
//!   token but is not part of it (`(\bfunc\s+)[a-z_]\w*` claims only the name).
//! - `greedy`: the rule is matched against the full source, so a match that
//!   starts in unclaimed text can swallow tokens claimed by earlier rules. This
//!   is what keeps `"a # b"` a single string even though comments come first.
//!
//! The regex engine has no look-around. Where a token must be *followed* by
//! something (a call's opening paren), the pattern wraps the token in a named
//! group `token` and only that group is claimed.
//!
//! ## Languages
//!
//! | Fence tag | Grammar |
//! |-----------|---------|
//! | `gdscript`, `gd` | [`GDSCRIPT`] |
//! | `gdshader`, `gdshaderinc` | [`GDSHADER`] |

use crate::types::LanguageTag;
use once_cell::sync::Lazy;
use regex::Regex;

/// Token categories, in the order the GDScript grammar declares them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    DocComment,
    Comment,
    String,
    ClassName,
    FunctionDefinition,
    Keyword,
    ControlFlow,
    GlobalFunction,
    FunctionCall,
    NodeReference,
    NodePath,
    StringName,
    Number,
    Boolean,
    Operator,
    Annotation,
    MemberAccess,
    Punctuation,
}

impl Category {
    /// CSS class emitted next to `token`.
    pub fn css_class(self) -> &'static str {
        match self {
            Category::DocComment => "doc-comment",
            Category::Comment => "comment",
            Category::String => "string",
            Category::ClassName => "class-name",
            Category::FunctionDefinition => "function-definition",
            Category::Keyword => "keyword",
            Category::ControlFlow => "control-flow",
            Category::GlobalFunction => "global-function",
            Category::FunctionCall => "function",
            Category::NodeReference => "node-reference",
            Category::NodePath => "node-path",
            Category::StringName => "string-name",
            Category::Number => "number",
            Category::Boolean => "boolean",
            Category::Operator => "operator",
            Category::Annotation => "annotation",
            Category::MemberAccess => "member",
            Category::Punctuation => "punctuation",
        }
    }

    pub const ALL: [Category; 18] = [
        Category::DocComment,
        Category::Comment,
        Category::String,
        Category::ClassName,
        Category::FunctionDefinition,
        Category::Keyword,
        Category::ControlFlow,
        Category::GlobalFunction,
        Category::FunctionCall,
        Category::NodeReference,
        Category::NodePath,
        Category::StringName,
        Category::Number,
        Category::Boolean,
        Category::Operator,
        Category::Annotation,
        Category::MemberAccess,
        Category::Punctuation,
    ];
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RuleFlags {
    pub greedy: bool,
    pub lookbehind: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub category: Category,
    pub pattern: &'static str,
    pub flags: RuleFlags,
}

impl Rule {
    const fn plain(category: Category, pattern: &'static str) -> Self {
        Self {
            category,
            pattern,
            flags: RuleFlags {
                greedy: false,
                lookbehind: false,
            },
        }
    }

    const fn greedy(category: Category, pattern: &'static str) -> Self {
        Self {
            category,
            pattern,
            flags: RuleFlags {
                greedy: true,
                lookbehind: false,
            },
        }
    }

    const fn lookbehind(category: Category, pattern: &'static str) -> Self {
        Self {
            category,
            pattern,
            flags: RuleFlags {
                greedy: false,
                lookbehind: true,
            },
        }
    }
}

pub const GDSCRIPT: &[Rule] = &[
    Rule::plain(Category::DocComment, r"##.*"),
    Rule::plain(Category::Comment, r"#.*"),
    Rule::greedy(
        Category::String,
        r#"@?(?:"""(?:[^\\]|\\[\s\S])*?"""|"(?:[^"\n\\]|\\[\s\S])*"|'(?:[^'\n\\]|\\[\s\S])*')"#,
    ),
    // class_name Foo / extends Bar / as Node / var x: int / func f(a: Item) -> Item
    Rule::lookbehind(
        Category::ClassName,
        r"(?m)(^(?:class|class_name|extends)[ \t]+|\bas[ \t]+|(?:\b(?:const|var)[ \t]|[,(])[ \t]*\w+[ \t]*:[ \t]*|->[ \t]*)[a-zA-Z_]\w*",
    ),
    Rule::lookbehind(Category::FunctionDefinition, r"(?im)(\bfunc\s+)[a-z_]\w*\b"),
    Rule::plain(
        Category::Keyword,
        r"\b(?:class|class_name|extends|is|in|as|self|signal|func|static|const|enum|var|breakpoint|preload|await|yield|assert|and|or|not|null)\b",
    ),
    Rule::plain(
        Category::ControlFlow,
        r"\b(?:if|elif|else|for|while|match|break|continue|pass|return)\b",
    ),
    Rule::plain(
        Category::GlobalFunction,
        r"\b(?:abs|absf|absi|acos|acosh|angle_difference|asin|asinh|atan|atan2|atanh|bezier_derivative|bezier_interpolate|bytes_to_var|bytes_to_var_with_objects|ceil|ceilf|ceili|clamp|clampf|clampi|cos|cosh|cubic_interpolate|cubic_interpolate_angle|cubic_interpolate_angle_in_time|cubic_interpolate_in_time|db_to_linear|deg_to_rad|ease|error_string|exp|floor|floorf|floori|fmod|fposmod|hash|instance_from_id|inverse_lerp|is_equal_approx|is_finite|is_inf|is_instance_id_valid|is_instance_valid|is_nan|is_same|is_zero_approx|lerp|lerp_angle|lerpf|linear_to_db|log|max|maxf|maxi|min|minf|mini|move_toward|nearest_po2|pingpong|posmod|pow|print|print_rich|print_verbose|printerr|printraw|prints|printt|push_error|push_warning|rad_to_deg|rand_from_seed|randf|randf_range|randfn|randi|randi_range|randomize|remap|rid_allocate_id|rid_from_int64|rotate_toward|round|roundf|roundi|seed|sign|signf|signi|sin|sinh|smoothstep|snapped|snappedf|snappedi|sqrt|step_decimals|str|str_to_var|tan|tanh|type_convert|type_string|typeof|var_to_bytes|var_to_bytes_with_objects|var_to_str|weakref|wrap|wrapf|wrapi)\b",
    ),
    Rule::plain(Category::FunctionCall, r"(?i)\b(?P<token>[a-zA-Z_]\w*)[ \t]*\("),
    Rule::plain(Category::NodeReference, r"[$%]\w+"),
    Rule::plain(Category::NodePath, r"\^\w+"),
    Rule::plain(Category::StringName, r"&\w+"),
    Rule::plain(
        Category::Number,
        r"\b0b[01_]+\b|\b0x[\da-fA-F_]+\b|(?:\b\d[\d_]*(?:\.[\d_]*)?|\B\.[\d_]+)(?:e[+-]?[\d_]+)?\b",
    ),
    Rule::plain(Category::Number, r"\b(?:INF|NAN|PI|TAU)\b"),
    Rule::plain(Category::Boolean, r"\b(?:false|true)\b"),
    Rule::plain(
        Category::Operator,
        r"->|:=|&&|\|\||<<|>>|[-+*/%&|!<>=]=?|[~^]",
    ),
    Rule::plain(Category::Annotation, r"@[a-zA-Z_]+\b"),
    Rule::plain(Category::MemberAccess, r"\.[a-zA-Z_]\w*\b"),
    Rule::plain(Category::Punctuation, r"[.:,;()\[\]{}]"),
];

pub const GDSHADER: &[Rule] = &[
    Rule::greedy(Category::DocComment, r"/\*\*[\s\S]*?\*/"),
    Rule::greedy(Category::Comment, r"//.*|/\*[\s\S]*?\*/"),
    Rule::greedy(Category::String, r#""(?:[^"\\\n]|\\.)*""#),
    Rule::plain(
        Category::Keyword,
        r"\b(?:shader_type|render_mode|group_uniforms|uniform|varying|const|struct|in|out|inout|flat|smooth|lowp|mediump|highp|if|else|for|while|do|switch|case|default|break|continue|return|discard|instance|global|true|false|void|bool|bvec[234]|int|ivec[234]|uint|uvec[234]|float|vec[234]|mat[234]|[iu]?sampler(?:2D|2DArray|3D)|sampler(?:Cube|CubeArray|ExternalOES))\b",
    ),
    Rule::plain(
        Category::Number,
        r"\b0x[\da-fA-F]+u?\b|(?:\b\d+(?:\.\d*)?|\B\.\d+)(?:e[+-]?\d+)?[fu]?\b",
    ),
    Rule::plain(
        Category::Operator,
        r"&&|\|\||<<=?|>>=?|\+\+|--|[-+*/%&|^!<>=]=?|[~?]",
    ),
    Rule::plain(Category::Punctuation, r"[.:,;()\[\]{}]"),
];

/// A rule with its pattern compiled.
#[derive(Debug)]
pub struct CompiledRule {
    pub rule: Rule,
    pub regex: Regex,
}

/// A compiled grammar, ready for the tokenizer.
#[derive(Debug)]
pub struct Grammar {
    pub name: &'static str,
    pub rules: Vec<CompiledRule>,
}

impl Grammar {
    /// Compile a rule table, keeping declaration order.
    pub fn compile(name: &'static str, table: &[Rule]) -> Result<Self, regex::Error> {
        let rules = table
            .iter()
            .map(|rule| {
                Ok(CompiledRule {
                    rule: *rule,
                    regex: Regex::new(rule.pattern)?,
                })
            })
            .collect::<Result<Vec<_>, regex::Error>>()?;
        Ok(Self { name, rules })
    }
}

static GDSCRIPT_GRAMMAR: Lazy<Grammar> =
    Lazy::new(|| Grammar::compile("gdscript", GDSCRIPT).expect("gdscript grammar must compile"));

static GDSHADER_GRAMMAR: Lazy<Grammar> =
    Lazy::new(|| Grammar::compile("gdshader", GDSHADER).expect("gdshader grammar must compile"));

/// Find the grammar for a fence language. `None` for unknown languages and
/// for the no-highlight sentinel.
pub fn lookup(language: &LanguageTag) -> Option<&'static Grammar> {
    match language {
        LanguageTag::NoHighlight => None,
        LanguageTag::Named(name) => match name.as_str() {
            "gdscript" | "gd" => Some(&GDSCRIPT_GRAMMAR),
            "gdshader" | "gdshaderinc" => Some(&GDSHADER_GRAMMAR),
            _ => None,
        },
    }
}
