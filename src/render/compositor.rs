//! # Output Graph Builder
//!
//! Builds the post-processing graph that demultiplexes the renderer's
//! internal buffers into one file per requested channel.
//!
//! Ordinary channels get a 1:1 slot on a generic file-output node. The two
//! integer index channels get a dual path: a direct link into a dedicated
//! 16-bit single-channel output (raw index values, the segmentation ground
//! truth) plus a divide-by-65536 math node feeding a normalized 0-1 preview
//! slot. The preview is derived and lossy; only the raw file preserves the
//! identity indices.

use std::path::{Path, PathBuf};

use crate::graph::NodeGraph;
use crate::render::passes::INDEX_CHANNELS;

/// Divisor mapping 16-bit integer indices into the 0-1 preview range.
pub const INDEX_NORMALIZER: f32 = 65536.0;

/// Channel layout of a file-output image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorMode {
    Rgba,
    /// Single channel, no color.
    Bw,
}

/// File-output pixel format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputFormat {
    pub color_mode: ColorMode,
    pub color_depth: u8,
}

impl OutputFormat {
    /// Default format for ordinary channels.
    pub fn rgba8() -> Self {
        Self {
            color_mode: ColorMode::Rgba,
            color_depth: 8,
        }
    }

    /// Format preserving raw 16-bit index values.
    pub fn bw16() -> Self {
        Self {
            color_mode: ColorMode::Bw,
            color_depth: 16,
        }
    }
}

/// Arithmetic performed by a [`CompositorNode::Math`] node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MathOp {
    Divide,
}

impl MathOp {
    pub fn apply(self, value: f32, operand: f32) -> f32 {
        match self {
            MathOp::Divide => value / operand,
        }
    }
}

/// Processing nodes of the compositor output graph.
#[derive(Debug, Clone, PartialEq)]
pub enum CompositorNode {
    /// Render source exposing one output port per enabled channel.
    RenderLayers { channels: Vec<String> },
    /// Interactive preview sink; always wired from the combined image.
    Composite,
    /// File writer with one input slot per bound channel. A `None` base
    /// path leaves the node path-less (preview-only mode, not an error).
    FileOutput {
        base_path: Option<PathBuf>,
        format: OutputFormat,
        slots: Vec<String>,
    },
    /// Single-value arithmetic applied to a channel.
    Math { operation: MathOp, operand: f32 },
}

/// The compositor output graph handed to the engine.
pub type CompositorGraph = NodeGraph<CompositorNode>;

/// Normalized preview value for a raw index, `index / 65536`.
pub fn normalized_index_value(index: u32) -> f32 {
    index as f32 / INDEX_NORMALIZER
}

/// Build a fresh output graph for the given render-layer channels.
///
/// The caller passes the channels produced by the enabled pass set (see
/// [`passes::enabled_channels`](crate::render::passes::enabled_channels)).
/// `output_dir` of `None` still creates every file-output node, just without
/// a path, so an interactive preview stays valid without writing files.
pub fn build_output_graph(channels: &[&str], output_dir: Option<&Path>) -> CompositorGraph {
    let mut graph = CompositorGraph::new();
    let base_path = output_dir.map(Path::to_path_buf);

    let source = graph.add(CompositorNode::RenderLayers {
        channels: channels.iter().map(|c| c.to_string()).collect(),
    });

    let composite = graph.add(CompositorNode::Composite);
    graph.link(source, "Image", composite, "Image");

    let file_out = graph.add(CompositorNode::FileOutput {
        base_path: base_path.clone(),
        format: OutputFormat::rgba8(),
        slots: Vec::new(),
    });

    for channel in channels {
        if INDEX_CHANNELS.contains(channel) {
            continue;
        }
        add_slot(&mut graph, file_out, channel);
        graph.link(source, channel, file_out, channel);
    }

    let index_out = graph.add(CompositorNode::FileOutput {
        base_path,
        format: OutputFormat::bw16(),
        slots: Vec::new(),
    });

    for channel in channels.iter().copied().filter(|c| INDEX_CHANNELS.contains(c)) {
        // Raw path: exact integer indices survive into the 16-bit file
        add_slot(&mut graph, index_out, channel);
        graph.link(source, channel, index_out, channel);

        // Preview path: normalized into 0-1 for human inspection
        let divider = graph.add_labeled(
            CompositorNode::Math {
                operation: MathOp::Divide,
                operand: INDEX_NORMALIZER,
            },
            &format!("{channel} normalize"),
        );
        graph.link(source, channel, divider, "Value");

        let preview = format!("Preview{channel}");
        add_slot(&mut graph, file_out, &preview);
        graph.link(divider, "Value", file_out, &preview);
    }

    graph
}

fn add_slot(graph: &mut CompositorGraph, node: crate::graph::NodeId, name: &str) {
    if let CompositorNode::FileOutput { slots, .. } = &mut graph.node_mut(node).kind {
        slots.push(name.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::NodeId;

    fn file_outputs(graph: &CompositorGraph) -> Vec<NodeId> {
        graph
            .nodes()
            .iter()
            .filter(|n| matches!(n.kind, CompositorNode::FileOutput { .. }))
            .map(|n| n.id)
            .collect()
    }

    #[test]
    fn test_preview_sink_always_wired_from_image() {
        let graph = build_output_graph(&["Image", "Alpha", "IndexOB"], None);
        let composite = graph
            .find(|k| matches!(k, CompositorNode::Composite))
            .unwrap();
        let link = graph.link_into(composite, "Image").unwrap();
        assert_eq!(link.from_port, "Image");
    }

    #[test]
    fn test_generic_channels_get_one_slot_each() {
        let graph = build_output_graph(&["Image", "Alpha", "Depth", "IndexOB"], None);
        let outs = file_outputs(&graph);
        assert_eq!(outs.len(), 2);

        let CompositorNode::FileOutput { slots, format, .. } = &graph.node(outs[0]).kind else {
            panic!("expected file output");
        };
        assert_eq!(
            slots,
            &["Image", "Alpha", "Depth", "PreviewIndexOB"]
        );
        assert_eq!(*format, OutputFormat::rgba8());
    }

    #[test]
    fn test_index_channel_dual_path() {
        let graph = build_output_graph(&["Image", "IndexOB", "IndexMA"], None);
        let outs = file_outputs(&graph);
        let index_out = outs[1];

        let CompositorNode::FileOutput { slots, format, .. } = &graph.node(index_out).kind else {
            panic!("expected file output");
        };
        assert_eq!(slots, &["IndexOB", "IndexMA"]);
        assert_eq!(*format, OutputFormat::bw16());

        // Raw path is a straight link from the render source
        let source = graph
            .find(|k| matches!(k, CompositorNode::RenderLayers { .. }))
            .unwrap();
        let raw = graph.link_into(index_out, "IndexOB").unwrap();
        assert_eq!(raw.from_node, source);
        assert_eq!(raw.from_port, "IndexOB");

        // Preview path goes through a divide node into the generic output
        let preview = graph.link_into(outs[0], "PreviewIndexOB").unwrap();
        let CompositorNode::Math { operation, operand } = graph.node(preview.from_node).kind
        else {
            panic!("expected math node feeding the preview slot");
        };
        assert_eq!(operation, MathOp::Divide);
        assert_eq!(operand, INDEX_NORMALIZER);
        let into_divider = graph.link_into(preview.from_node, "Value").unwrap();
        assert_eq!(into_divider.from_node, source);
        assert_eq!(into_divider.from_port, "IndexOB");
    }

    #[test]
    fn test_output_dir_propagates_to_file_nodes() {
        let dir = Path::new("/tmp/run");
        let graph = build_output_graph(&["Image", "IndexOB"], Some(dir));
        for id in file_outputs(&graph) {
            let CompositorNode::FileOutput { base_path, .. } = &graph.node(id).kind else {
                unreachable!();
            };
            assert_eq!(base_path.as_deref(), Some(dir));
        }

        // Preview-only mode keeps the nodes but leaves them path-less
        let graph = build_output_graph(&["Image", "IndexOB"], None);
        for id in file_outputs(&graph) {
            let CompositorNode::FileOutput { base_path, .. } = &graph.node(id).kind else {
                unreachable!();
            };
            assert!(base_path.is_none());
        }
    }

    #[test]
    fn test_graph_is_acyclic_and_rebuilt_fresh() {
        let first = build_output_graph(&["Image", "IndexOB"], None);
        assert!(first.is_acyclic());

        let second = build_output_graph(&["Image", "IndexOB"], None);
        assert_eq!(first.nodes().len(), second.nodes().len());
        assert_eq!(first.links().len(), second.links().len());
    }

    #[test]
    fn test_normalized_preview_matches_raw_over_index_range() {
        for index in [0u32, 1, 7, 255, 4096, 65535] {
            let normalized = MathOp::Divide.apply(index as f32, INDEX_NORMALIZER);
            assert_eq!(normalized, normalized_index_value(index));
            assert_eq!(normalized, index as f32 / 65536.0);
            assert!((0.0..1.0).contains(&normalized));
        }
    }
}
