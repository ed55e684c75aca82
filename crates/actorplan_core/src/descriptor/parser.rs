//! Actor and variant XML parser.
//!
//! # Supported Syntax
//!
//! - `<actor>` root with `<group>` children and an optional `<material>`
//! - `<variant name file frequency>` with `<mesh>`, `<decal>`,
//!   `<textures>` and `<props>` children
//! - `<variant>` as the root of inheritance-parent files
//!
//! Elements the resolver has no use for (`castshadow`, `animations`,
//! `particles`, ...) are skipped.

use roxmltree::{Document, Node};
use thiserror::Error;

use super::types::*;

/// Errors that can occur during descriptor parsing.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("malformed XML: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("expected <{expected}> root element, found <{found}>")]
    UnexpectedRoot { expected: &'static str, found: String },

    #[error("<{element}> at line {line} is missing attribute '{attribute}'")]
    MissingAttribute {
        element: &'static str,
        attribute: &'static str,
        line: u32,
    },

    #[error("<{element}> at line {line} is empty")]
    EmptyElement { element: &'static str, line: u32 },

    #[error("invalid number '{value}' for '{attribute}' at line {line}")]
    InvalidNumber {
        attribute: &'static str,
        value: String,
        line: u32,
    },
}

/// Result type for parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// Parse an actor document.
pub fn parse_actor_str(content: &str) -> ParseResult<ActorDescriptor> {
    let doc = Document::parse(content)?;
    let root = doc.root_element();
    expect_root(root, "actor")?;

    let mut actor = ActorDescriptor::default();
    for child in root.children().filter(Node::is_element) {
        match child.tag_name().name() {
            "group" => actor.groups.push(parse_group(&doc, child)?),
            "material" => {
                let text = child.text().map(str::trim).unwrap_or_default();
                if !text.is_empty() {
                    actor.material = Some(text.to_string());
                }
            }
            _ => {}
        }
    }

    Ok(actor)
}

/// Parse an inheritance-parent document (a lone `<variant>`).
pub fn parse_variant_str(content: &str) -> ParseResult<Variant> {
    let doc = Document::parse(content)?;
    let root = doc.root_element();
    expect_root(root, "variant")?;
    parse_variant(&doc, root)
}

fn expect_root(root: Node, expected: &'static str) -> ParseResult<()> {
    let found = root.tag_name().name();
    if found != expected {
        return Err(ParseError::UnexpectedRoot {
            expected,
            found: found.to_string(),
        });
    }
    Ok(())
}

fn parse_group(doc: &Document, node: Node) -> ParseResult<VariantGroup> {
    let variants = node
        .children()
        .filter(|n| n.has_tag_name("variant"))
        .map(|n| parse_variant(doc, n))
        .collect::<ParseResult<Vec<_>>>()?;
    Ok(VariantGroup::new(variants))
}

fn parse_variant(doc: &Document, node: Node) -> ParseResult<Variant> {
    let mut variant = Variant {
        name: attr(node, "name"),
        file: attr(node, "file").filter(|f| !f.is_empty()),
        frequency: attr(node, "frequency"),
        ..Default::default()
    };

    // The first element of each kind wins.
    for child in node.children().filter(Node::is_element) {
        match child.tag_name().name() {
            "mesh" if variant.mesh.is_none() => {
                let path = child.text().map(str::trim).unwrap_or_default();
                if path.is_empty() {
                    return Err(ParseError::EmptyElement {
                        element: "mesh",
                        line: line_of(doc, child),
                    });
                }
                variant.mesh = Some(MeshSpec::Mesh {
                    path: path.to_string(),
                });
            }
            "decal" if variant.mesh.is_none() => {
                variant.mesh = Some(MeshSpec::Decal(parse_decal(doc, child)?));
            }
            "textures" if variant.textures.is_none() => {
                let textures = child
                    .children()
                    .filter(|n| n.has_tag_name("texture"))
                    .map(|n| {
                        let name = required(doc, n, "texture", "name")?;
                        let file = required(doc, n, "texture", "file")?;
                        Ok(TextureRef::new(name, file))
                    })
                    .collect::<ParseResult<Vec<_>>>()?;
                variant.textures = Some(textures);
            }
            "props" if variant.props.is_none() => {
                let props = child
                    .children()
                    .filter(|n| n.has_tag_name("prop"))
                    .map(|n| {
                        let attachpoint = required(doc, n, "prop", "attachpoint")?;
                        let actor = attr(n, "actor").unwrap_or_default();
                        Ok(PropRef::new(attachpoint, actor))
                    })
                    .collect::<ParseResult<Vec<_>>>()?;
                variant.props = Some(props);
            }
            "mesh" | "decal" | "textures" | "props" => {
                log::debug!(
                    "Ignoring duplicate <{}> in variant {} (line {})",
                    child.tag_name().name(),
                    variant.label(),
                    line_of(doc, child)
                );
            }
            _ => {}
        }
    }

    Ok(variant)
}

fn parse_decal(doc: &Document, node: Node) -> ParseResult<DecalSpec> {
    Ok(DecalSpec {
        offset_x: number(doc, node, "offsetx")?,
        offset_z: number(doc, node, "offsetz")?,
        width: number(doc, node, "width")?,
        depth: number(doc, node, "depth")?,
        angle: number(doc, node, "angle")?,
    })
}

fn attr(node: Node, name: &str) -> Option<String> {
    node.attribute(name).map(str::to_string)
}

fn required(
    doc: &Document,
    node: Node,
    element: &'static str,
    attribute: &'static str,
) -> ParseResult<String> {
    attr(node, attribute).ok_or_else(|| ParseError::MissingAttribute {
        element,
        attribute,
        line: line_of(doc, node),
    })
}

fn number(doc: &Document, node: Node, attribute: &'static str) -> ParseResult<f32> {
    let raw = required(doc, node, "decal", attribute)?;
    raw.trim()
        .parse::<f32>()
        .map_err(|_| ParseError::InvalidNumber {
            attribute,
            value: raw,
            line: line_of(doc, node),
        })
}

fn line_of(doc: &Document, node: Node) -> u32 {
    doc.text_pos_at(node.range().start).row
}
