//! Structured fuzz target for set compilation.
//!
//! Instead of raw JSON, this target generates well-formed set trees with
//! a mix of known and unknown condition names and adversarial owner
//! payloads, exercising the combinator and fail-closed paths directly.
//!
//! Run with:
//! ```bash
//! cargo +nightly fuzz run fuzz_compile_structured
//! ```

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use setra_filter::{Filter, OwnerScope, Set, SetCompiler};

/// Generator-friendly mirror of a set tree node.
#[derive(Debug, Arbitrary)]
enum FuzzNode {
    Condition { name: FuzzName, param: Option<String> },
    All(Vec<FuzzNode>),
    Any(Vec<FuzzNode>),
}

#[derive(Debug, Arbitrary)]
enum FuzzName {
    Publics,
    Actives,
    Inactives,
    Pendings,
    Owners,
    My,
    Day,
    Week,
    Month,
    Prod,
    Other(String),
}

impl FuzzName {
    fn as_str(&self) -> &str {
        match self {
            FuzzName::Publics => "publics",
            FuzzName::Actives => "actives",
            FuzzName::Inactives => "inactives",
            FuzzName::Pendings => "pendings",
            FuzzName::Owners => "owners",
            FuzzName::My => "my",
            FuzzName::Day => "day",
            FuzzName::Week => "week",
            FuzzName::Month => "month",
            FuzzName::Prod => "prod",
            FuzzName::Other(name) => name,
        }
    }
}

// Cap the generated tree so the harness itself stays bounded; the
// compiler has its own depth guard beyond this.
fn build(node: &FuzzNode, depth: usize) -> Set {
    if depth > 12 {
        return Set::new();
    }
    match node {
        FuzzNode::Condition { name, param } => match param {
            Some(param) => Set::new().condition_with(name.as_str(), param.clone()),
            None => Set::new().condition(name.as_str()),
        },
        FuzzNode::All(children) => Set::new().all(children.iter().map(|c| build(c, depth + 1))),
        FuzzNode::Any(children) => Set::new().any(children.iter().map(|c| build(c, depth + 1))),
    }
}

fuzz_target!(|node: FuzzNode| {
    let set = build(&node, 0);
    let compiler = SetCompiler::with_scope(OwnerScope::new().with_user("u1").with_group("g1"));
    let filter = compiler.compile(&set, Filter::new());
    let _ = serde_json::to_string(&filter);
});
