//! Rendered code block containers.
//!
//! A code block renders as a `<pre>` container holding a `<code>` element and,
//! for named fences, a filename caption:
//!
//! ```html
//! <pre class="named-fence-block line-numbers" style="counter-reset: linenumber 9;">
//!   <div class="named-fence-filename">player.gd</div>
//!   <code class="language-gdscript">…annotated markup…</code>
//! </pre>
//! ```
//!
//! The container is modelled as a plain value ([`CodeContainer`]) so the
//! caption fix-up is a pure function over it: upstream renderers put the
//! caption after the code, and [`reorder_caption`] moves it to the front.
//! The fix-up runs for every block, numbered or not.

use crate::fence::FenceInfo;
use crate::highlight;
use crate::lines::{self, AnnotateError, CodeBlock, LineNumbering};
use crate::types::LanguageTag;
use maud::{Markup, PreEscaped, html};

/// A child of the `<pre>` container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContainerNode {
    Code {
        language: LanguageTag,
        start_line: Option<u32>,
        highlight: Option<String>,
        markup: String,
    },
    Caption(String),
}

/// The `<pre>` element wrapping a code block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeContainer {
    pub classes: Vec<String>,
    pub style: Option<String>,
    pub children: Vec<ContainerNode>,
}

impl CodeContainer {
    pub fn add_class(&mut self, class: &str) {
        if !self.classes.iter().any(|c| c == class) {
            self.classes.push(class.to_string());
        }
    }
}

/// Move the first filename caption, wherever it is, to the front.
pub fn reorder_caption(mut container: CodeContainer) -> CodeContainer {
    let caption = container
        .children
        .iter()
        .position(|node| matches!(node, ContainerNode::Caption(_)));
    if let Some(pos) = caption {
        let node = container.children.remove(pos);
        container.children.insert(0, node);
    }
    container
}

pub fn render_container(container: &CodeContainer) -> Markup {
    let class = (!container.classes.is_empty()).then(|| container.classes.join(" "));
    html! {
        pre class=[class] style=[container.style.as_deref()] {
            @for node in &container.children {
                @match node {
                    ContainerNode::Code { language, start_line, highlight, markup } => {
                        code class={ "language-" (language.as_str()) }
                            data-start=[*start_line]
                            data-highlight=[highlight.as_deref()] {
                            (PreEscaped(markup))
                        }
                    },
                    ContainerNode::Caption(name) => {
                        div class="named-fence-filename" { (name) }
                    },
                }
            }
        }
    }
}

/// A fully rendered block plus its numbering, for reporting.
#[derive(Debug, Clone)]
pub struct RenderedBlock {
    pub html: String,
    pub language: LanguageTag,
    pub numbering: Option<LineNumbering>,
}

/// Highlight, number and wrap one fenced block.
///
/// With `line_numbers` off the block is highlighted but never annotated, so
/// its `data-highlight` is not validated either.
pub fn render_block(
    code: &str,
    info: &FenceInfo,
    line_numbers: bool,
) -> Result<RenderedBlock, AnnotateError> {
    let code = code.strip_suffix('\n').unwrap_or(code);
    let highlighted = highlight::highlight(code, &info.language);

    let mut block = CodeBlock::new(highlighted, info.language.clone())
        .with_start_line(info.start_line.unwrap_or(1));
    block.highlight = info.highlight.clone();

    let (markup, numbering) = if line_numbers {
        let annotated = lines::annotate(&block)?;
        (annotated.markup, annotated.numbering)
    } else {
        (block.markup, None)
    };

    let mut container = CodeContainer::default();
    container.children.push(ContainerNode::Code {
        language: info.language.clone(),
        start_line: info.start_line,
        highlight: info.highlight.clone(),
        markup,
    });
    if let Some(filename) = &info.filename {
        container.add_class("named-fence-block");
        container
            .children
            .push(ContainerNode::Caption(filename.clone()));
    }
    if let Some(numbering) = &numbering {
        container.add_class("line-numbers");
        container.style = Some(numbering.counter_reset_style());
    }
    let container = reorder_caption(container);

    Ok(RenderedBlock {
        html: render_container(&container).into_string(),
        language: info.language.clone(),
        numbering,
    })
}
