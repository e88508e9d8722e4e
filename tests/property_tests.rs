//! Property-based checks on keys, validation and state-machine invariants

mod common;

use common::strategies::{state_word_strategy, target_name_strategy};
use proptest::prelude::*;

use statehook::models::{task_key, TargetState, Task, TaskStatus};
use statehook::state_machine::{ExecutionEvent, ExecutionState, ExecutionStateMachine};
use statehook::validation::{parse_target_state, validate_intent, validate_target_name};

fn event_strategy() -> impl Strategy<Value = ExecutionEvent> {
    prop_oneof![
        Just(ExecutionEvent::Authenticated),
        Just(ExecutionEvent::Located),
        Just(ExecutionEvent::AlreadySatisfied),
        Just(ExecutionEvent::TransitionRequested),
        Just(ExecutionEvent::TargetConfirmed),
        Just(ExecutionEvent::PollBudgetExhausted),
        "[a-z ]{0,20}".prop_map(ExecutionEvent::Fail),
    ]
}

proptest! {
    #[test]
    fn task_key_is_deterministic(name in target_name_strategy()) {
        prop_assert_eq!(task_key("worker:server", &name), task_key("worker:server", &name));
        prop_assert_eq!(
            task_key("worker:server", &name),
            format!("worker:server:{name}:state_change")
        );
    }

    #[test]
    fn distinct_names_get_distinct_keys(a in target_name_strategy(), b in target_name_strategy()) {
        prop_assume!(a != b);
        prop_assert_ne!(task_key("worker:server", &a), task_key("worker:server", &b));
    }

    #[test]
    fn state_parsing_ignores_case(word in state_word_strategy()) {
        let expected = if word.eq_ignore_ascii_case("up") {
            TargetState::Up
        } else {
            TargetState::Down
        };
        prop_assert_eq!(parse_target_state(&word).unwrap(), expected);
        prop_assert_eq!(parse_target_state(&format!("  {word} ")).unwrap(), expected);
    }

    #[test]
    fn other_state_words_are_rejected(word in "[a-zA-Z]{1,12}") {
        prop_assume!(!word.eq_ignore_ascii_case("up") && !word.eq_ignore_ascii_case("down"));
        let err = parse_target_state(&word).unwrap_err();
        prop_assert!(!err.is_retryable());
        prop_assert!(err.to_string().contains("UP, DOWN"));
    }

    #[test]
    fn valid_names_are_accepted(name in target_name_strategy(), word in state_word_strategy()) {
        prop_assert!(validate_target_name(&name).is_ok());
        prop_assert!(validate_intent(&name, &word).is_ok());
    }

    #[test]
    fn overlong_names_are_rejected(extra in 1usize..64) {
        let name = "n".repeat(255 + extra);
        prop_assert!(validate_target_name(&name).is_err());
    }

    #[test]
    fn terminal_task_status_never_changes(fail_first in any::<bool>(), reason in "[a-z]{1,16}") {
        let mut task = Task::new("vm-1", TargetState::Up);
        if fail_first {
            task.mark_failed(reason.clone()).unwrap();
        } else {
            task.mark_completed().unwrap();
        }
        let settled = task.clone();

        prop_assert!(task.mark_completed().is_err());
        prop_assert!(task.mark_failed("again").is_err());
        prop_assert_eq!(&task, &settled);
        prop_assert_ne!(task.status, TaskStatus::Processing);
    }

    #[test]
    fn execution_machine_stays_on_graph(events in proptest::collection::vec(event_strategy(), 0..16)) {
        let mut machine = ExecutionStateMachine::new();

        for event in events {
            let before = machine.current_state();
            match machine.transition(event) {
                Ok(next) => prop_assert!(before.can_transition_to(next)),
                Err(_) => prop_assert_eq!(machine.current_state(), before),
            }
        }

        let path = machine.path();
        prop_assert_eq!(path[0], ExecutionState::Authenticating);
        prop_assert!(path.windows(2).all(|pair| pair[0].can_transition_to(pair[1])));
        // Nothing follows a terminal state
        prop_assert!(path[..path.len() - 1].iter().all(|state| !state.is_terminal()));
    }
}
