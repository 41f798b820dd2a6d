//! Printers: text and markdown (termimad).

use bctbridge::bct::{AlgorithmDescriptor, InputConstraint, Output, OutputSpec, ScalarData};
use owo_colors::OwoColorize;
use termimad::MadSkin;

pub struct TextPrinter {
    pub color: bool,
}

impl TextPrinter {
    pub fn heading(&self, text: &str) {
        if self.color {
            println!("{}", text.magenta().bold());
        } else {
            println!("{}", text);
        }
    }

    pub fn status(&self, ok: bool, text: &str) {
        match (self.color, ok) {
            (true, true) => println!("{}", text.green()),
            (true, false) => println!("{}", text.yellow()),
            (false, _) => println!("{}", text),
        }
    }

    pub fn variant(&self, d: &AlgorithmDescriptor) {
        if self.color {
            println!("  {:<16} {}", d.id.cyan(), d.name);
        } else {
            println!("  {:<16} {}", d.id, d.name);
        }
    }

    pub fn outputs(&self, outputs: &[Output]) {
        for o in outputs {
            let line = match o {
                Output::Measure(m) => format!("{}: array {:?}", m.title, m.array_data.shape()),
                Output::Scalar(v) => match v.data_value {
                    ScalarData::Float(x) => format!("{}: {}", v.data_name, x),
                    ScalarData::Int(x) => format!("{}: {}", v.data_name, x),
                },
            };
            if self.color {
                println!("{}", line.green());
            } else {
                println!("{}", line);
            }
        }
    }
}

pub struct MarkdownPrinter {
    pub skin: MadSkin,
}

impl Default for MarkdownPrinter {
    fn default() -> Self {
        Self { skin: MadSkin::default() }
    }
}

impl MarkdownPrinter {
    pub fn print(&self, text: &str) {
        self.skin.print_text(text);
        println!();
    }
}

pub fn descriptor_markdown(d: &AlgorithmDescriptor) -> String {
    let mut md = format!("# {}\n\n", d.name);
    md.push_str(&format!("*{} / {}*\n\n", d.group.subsection, d.group.name));
    md.push_str(&format!("{}\n\n", d.description));
    md.push_str(&format!("Documented in `{}`.\n\n", d.doc_file));
    md.push_str("## Input\n\n");
    md.push_str(&format!("* `connectivity`: {}", d.connectivity_label));
    if d.constraint == InputConstraint::Undirected {
        md.push_str(" (must be undirected)");
    }
    md.push_str("\n\n## Snippet\n\n");
    md.push_str(&format!("```\n{}\n```\n\n", d.snippet));
    md.push_str(&format!("Weights are bound to `{}`.\n\n", d.binding));
    md.push_str("## Outputs\n\n");
    for spec in &d.outputs {
        match spec {
            OutputSpec::Measure { key, title, .. } => {
                md.push_str(&format!("* `{}`: {} (measure)\n", key, title));
            }
            OutputSpec::Scalar { key, title, kind } => {
                md.push_str(&format!("* `{}`: {} ({:?} value)\n", key, title, kind));
            }
        }
    }
    md
}

#[cfg(test)]
mod tests {
    use super::*;
    use bctbridge::bct::Registry;

    #[test]
    fn test_descriptor_markdown_lists_outputs_in_order() {
        let reg = Registry::builtin();
        let md = descriptor_markdown(reg.get("findwalks").unwrap());
        let wq = md.find("`Wq`").unwrap();
        let twalk = md.find("`twalk`").unwrap();
        let wlq = md.find("`wlq`").unwrap();
        assert!(wq < twalk && twalk < wlq);
        assert!(md.contains("[Wq,twalk,wlq]  = findwalks(A);"));
    }

    #[test]
    fn test_undirected_marker() {
        let reg = Registry::builtin();
        assert!(descriptor_markdown(reg.get("modularity_und").unwrap()).contains("must be undirected"));
        assert!(!descriptor_markdown(reg.get("modularity_dir").unwrap()).contains("must be undirected"));
    }
}
