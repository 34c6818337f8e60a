use polishplan::naming::{PolishChain, unroll};

fn chain(spec: &str) -> PolishChain {
    PolishChain::parse(spec).unwrap()
}

fn rendered(chains: Vec<PolishChain>) -> Vec<String> {
    chains.into_iter().map(|c| c.to_string()).collect()
}

#[test]
fn without_unroll_returns_chain_only() {
    let c = chain("racon-ont-2.medaka-ont-1");
    assert_eq!(unroll(&c, false), vec![c.clone()]);
}

#[test]
fn empty_chain_unrolls_to_nothing() {
    assert!(unroll(&PolishChain::empty(), true).is_empty());
}

#[test]
fn iterations_count_down_then_reset_to_previous_step() {
    let out = rendered(unroll(&chain("racon-ont-2.medaka-ont-1"), true));
    assert_eq!(
        out,
        vec!["racon-ont-2.medaka-ont-1", "racon-ont-2", "racon-ont-1"]
    );
}

#[test]
fn removing_a_step_leaves_previous_iteration_untouched() {
    let out = rendered(unroll(&chain("racon-ont-3.pilon-ill-2"), true));
    assert_eq!(
        out,
        vec![
            "racon-ont-3.pilon-ill-2",
            "racon-ont-3.pilon-ill-1",
            "racon-ont-3",
            "racon-ont-2",
            "racon-ont-1",
        ]
    );
}

#[test]
fn depth_is_kept_while_decrementing() {
    let out = rendered(unroll(&chain("racon-ont40-2"), true));
    assert_eq!(out, vec!["racon-ont40-2", "racon-ont40-1"]);
}
