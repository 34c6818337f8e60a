use proptest::prelude::*;

use polishplan::naming::{ArtifactName, PolishChain, PolishStep, Polisher, ReadType, unroll};

fn step_strategy() -> impl Strategy<Value = PolishStep> {
    (
        prop::sample::select(Polisher::ALL.to_vec()),
        prop::sample::select(ReadType::ALL.to_vec()),
        prop::option::of(1u32..500),
        1u32..6,
    )
        .prop_map(|(polisher, read_type, depth, iteration)| PolishStep {
            polisher,
            read_type,
            depth: depth.filter(|_| read_type.supports_depth()),
            iteration,
        })
}

fn chain_strategy() -> impl Strategy<Value = PolishChain> {
    proptest::collection::vec(step_strategy(), 0..6).prop_map(PolishChain::new)
}

fn artifact_strategy() -> impl Strategy<Value = ArtifactName> {
    ("[A-Za-z0-9_-]{1,12}", "[A-Za-z0-9_-]{1,12}", chain_strategy()).prop_map(
        |(uuid, spell, chain)| ArtifactName {
            uuid,
            assembler_config: spell,
            chain,
        },
    )
}

proptest! {
    #[test]
    fn parse_inverts_serialize(name in artifact_strategy()) {
        let text = name.serialize();
        let parsed = ArtifactName::parse(&text);
        prop_assert!(parsed.is_ok(), "failed to parse {text}: {parsed:?}");
        prop_assert_eq!(parsed.unwrap(), name);
    }

    #[test]
    fn unroll_has_one_entry_per_pass(chain in chain_strategy()) {
        let out = unroll(&chain, true);
        prop_assert_eq!(out.len(), chain.total_passes());

        if let Some(first) = out.first() {
            prop_assert_eq!(first, &chain);
        }

        // Every entry is strictly "smaller" than the one before it.
        for pair in out.windows(2) {
            prop_assert_eq!(pair[0].total_passes(), pair[1].total_passes() + 1);
            prop_assert!(pair[1].len() <= pair[0].len());
        }

        if let Some(last) = out.last() {
            prop_assert_eq!(last.total_passes(), 1);
        }
    }
}
