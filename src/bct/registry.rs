//! Registered analysis variants.

use super::{
    connectivity::Connectivity,
    descriptor::{AlgorithmDescriptor, AlgorithmGroup, InputConstraint, OutputSpec},
};
use crate::error::{BctError, Result};

pub const BCT_SUBSECTION: &str = "Brain Connectivity Toolbox";

pub const LABEL_CONNECTIVITY: &str = "Connection matrix:";
pub const LABEL_CONNECTIVITY_DIRECTED: &str = "Directed (weighted or binary) connection matrix:";
pub const LABEL_CONNECTIVITY_UNDIRECTED: &str = "Undirected connection matrix:";
pub const LABEL_CONNECTIVITY_WEIGHTED: &str = "Weighted (directed/undirected) connection matrix:";

pub fn group_modularity() -> AlgorithmGroup {
    AlgorithmGroup::new("Modularity Algorithms", BCT_SUBSECTION, "bct")
}

pub fn group_distance() -> AlgorithmGroup {
    AlgorithmGroup::new("Distance Algorithms", BCT_SUBSECTION, "bctdistance")
}

#[derive(Debug, Clone, Default)]
pub struct Registry {
    variants: Vec<AlgorithmDescriptor>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every BCT variant shipped with the crate.
    pub fn builtin() -> Self {
        Self {
            variants: builtin_descriptors(),
        }
    }

    pub fn register(&mut self, descriptor: AlgorithmDescriptor) -> Result<()> {
        if self.get(&descriptor.id).is_some() {
            return Err(BctError::DuplicateVariant(descriptor.id));
        }
        self.variants.push(descriptor);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&AlgorithmDescriptor> {
        self.variants.iter().find(|d| d.id == id)
    }

    pub fn lookup(&self, id: &str) -> Result<&AlgorithmDescriptor> {
        self.get(id)
            .ok_or_else(|| BctError::UnknownVariant(id.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &AlgorithmDescriptor> {
        self.variants.iter()
    }

    pub fn len(&self) -> usize {
        self.variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }

    pub fn group<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a AlgorithmDescriptor> + 'a {
        self.variants.iter().filter(move |d| d.group.key == key)
    }

    /// Variants whose input schema accepts `connectivity`.
    pub fn applicable<'a>(
        &'a self,
        connectivity: &'a Connectivity,
    ) -> impl Iterator<Item = &'a AlgorithmDescriptor> + 'a {
        self.variants
            .iter()
            .filter(move |d| d.input_schema().accepts(connectivity))
    }
}

struct Builtin {
    id: &'static str,
    name: &'static str,
    description: &'static str,
    label: &'static str,
    constraint: InputConstraint,
    snippet: &'static str,
    binding: &'static str,
}

impl Builtin {
    fn build(self, group: AlgorithmGroup, outputs: Vec<OutputSpec>) -> AlgorithmDescriptor {
        AlgorithmDescriptor {
            id: self.id.into(),
            group,
            name: self.name.into(),
            description: self.description.into(),
            doc_file: format!("{}.m", self.id),
            connectivity_label: self.label.into(),
            constraint: self.constraint,
            snippet: self.snippet.into(),
            binding: self.binding.into(),
            outputs,
        }
    }
}

fn modularity_outputs() -> Vec<OutputSpec> {
    vec![
        OutputSpec::measure("Ci", "Optimal Community Structure"),
        OutputSpec::float("Q", "Maximized Modularity"),
    ]
}

fn reachability_outputs() -> Vec<OutputSpec> {
    vec![
        OutputSpec::measure("R", "Reachability matrix"),
        OutputSpec::measure("D", "Distance matrix"),
    ]
}

fn builtin_descriptors() -> Vec<AlgorithmDescriptor> {
    vec![
        Builtin {
            id: "modularity_dir",
            name: "Optimal Community Structure and Modularity",
            description: "Subdivides a directed network into non-overlapping groups of nodes \
                          which maximizes the number of within-group edges and minimizes \
                          the number of between-group edges (Newman's spectral method).",
            label: LABEL_CONNECTIVITY_DIRECTED,
            constraint: InputConstraint::Any,
            snippet: "[Ci,Q] = modularity_dir(CW);",
            binding: "CW",
        }
        .build(group_modularity(), modularity_outputs()),
        Builtin {
            id: "modularity_und",
            name: "Optimal Community Structure and Modularity (Undirected)",
            description: "Subdivides an undirected network into non-overlapping groups of nodes \
                          which maximizes the number of within-group edges and minimizes \
                          the number of between-group edges (Newman's spectral method).",
            label: LABEL_CONNECTIVITY_UNDIRECTED,
            constraint: InputConstraint::Undirected,
            snippet: "[Ci,Q] = modularity_und(CW);",
            binding: "CW",
        }
        .build(group_modularity(), modularity_outputs()),
        Builtin {
            id: "distance_bin",
            name: "Distance binary matrix",
            description: "Length of the shortest path between every pair of nodes in a binary \
                          graph; unreachable pairs have infinite distance.",
            label: LABEL_CONNECTIVITY,
            constraint: InputConstraint::Any,
            snippet: "D = distance_bin(A);",
            binding: "A",
        }
        .build(group_distance(), vec![OutputSpec::measure("D", "Distance matrix")]),
        Builtin {
            id: "distance_wei",
            name: "Distance weighted matrix",
            description: "Length of the shortest weighted path between every pair of nodes \
                          (Dijkstra's algorithm); weights are interpreted as lengths.",
            label: LABEL_CONNECTIVITY_WEIGHTED,
            constraint: InputConstraint::Any,
            snippet: "D = distance_wei(A);",
            binding: "A",
        }
        .build(group_distance(), vec![OutputSpec::measure("D", "Distance matrix")]),
        Builtin {
            id: "breadthdist",
            name: "Reachability and distance matrices (Breadth-first search)",
            description: "Reachability and distance matrices computed by breadth-first search \
                          from every node.",
            label: LABEL_CONNECTIVITY,
            constraint: InputConstraint::Any,
            snippet: "[R,D] = breadthdist(A);",
            binding: "A",
        }
        .build(group_distance(), reachability_outputs()),
        Builtin {
            id: "reachdist",
            name: "Reachability and distance matrices (Algebraic path count)",
            description: "Reachability and distance matrices computed from powers of the \
                          adjacency matrix (algebraic path count).",
            label: LABEL_CONNECTIVITY,
            constraint: InputConstraint::Any,
            snippet: "[R,D] = reachdist(A);",
            binding: "A",
        }
        .build(group_distance(), reachability_outputs()),
        Builtin {
            id: "findwalks",
            name: "Network walks",
            description: "Counts walks of every length between node pairs, the total number \
                          of walks and the walk length distribution.",
            label: LABEL_CONNECTIVITY,
            constraint: InputConstraint::Any,
            snippet: "[Wq,twalk,wlq]  = findwalks(A);",
            binding: "A",
        }
        .build(
            group_distance(),
            vec![
                OutputSpec::measure("Wq", "3D matrix"),
                OutputSpec::float("twalk", "Total number of walks found"),
                OutputSpec::measure("wlq", "Walk length distribution"),
            ],
        ),
    ]
}
