// SPDX-License-Identifier: MIT

//! Feasibility table (§6.3): a constant 7x7 matrix, not derived at runtime.

use crate::state::LifecycleState;

// Row/column order: CRT IDL RUN DST EXT CLD APL
#[rustfmt::skip]
const FEASIBLE: [[bool; LifecycleState::COUNT]; LifecycleState::COUNT] = [
    //           CRT    IDL    RUN    DST    EXT    CLD    APL
    /* CRT */ [  true,  false, true,  true,  false, false, false ],
    /* IDL */ [  false, true,  true,  true,  false, false, true  ],
    /* RUN */ [  false, true,  true,  true,  false, true,  true  ],
    /* DST */ [  false, false, false, true,  true,  false, false ],
    /* EXT */ [  false, false, false, false, true,  false, false ],
    /* CLD */ [  false, false, false, true,  false, true,  false ],
    /* APL */ [  false, true,  true,  true,  false, false, false ],
];

/// Returns whether the configurator may transition from `from` to `to`.
/// Self-loops are always feasible (I8 / the table's diagonal is all `true`).
pub fn is_feasible(from: LifecycleState, to: LifecycleState) -> bool {
    FEASIBLE[from.index()][to.index()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::prop_assert_eq;

    #[test]
    fn self_loops_are_always_feasible() {
        for s in LifecycleState::ALL {
            assert!(is_feasible(s, s), "{s} -> {s} must be feasible");
        }
    }

    #[test]
    fn creating_can_reach_idle_but_not_cooling_down() {
        assert!(is_feasible(LifecycleState::Creating, LifecycleState::Idle));
        assert!(!is_feasible(
            LifecycleState::Creating,
            LifecycleState::CoolingDown
        ));
    }

    #[test]
    fn destroying_only_reaches_itself_and_exiting() {
        for to in LifecycleState::ALL {
            let expect = matches!(to, LifecycleState::Destroying | LifecycleState::Exiting);
            assert_eq!(is_feasible(LifecycleState::Destroying, to), expect);
        }
    }

    proptest::proptest! {
        #[test]
        fn exiting_is_a_terminal_sink(to_idx in 0usize..LifecycleState::COUNT) {
            let to = LifecycleState::ALL[to_idx];
            let feasible = is_feasible(LifecycleState::Exiting, to);
            prop_assert_eq!(feasible, to == LifecycleState::Exiting);
        }
    }
}
