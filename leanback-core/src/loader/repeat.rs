use leanback_model::RepeatPolicy;

/// Everything end-of-video resolution looks at, gathered up front so the
/// decision itself is a pure function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndFacts {
    pub policy: RepeatPolicy,
    pub finish_on_ended: bool,
    /// A short is playing and the shorts-loop override is on.
    pub loop_short: bool,
    /// The user queue has an item after the current one.
    pub has_queued: bool,
    pub suggestions_shown: bool,
    pub dialog_open: bool,
    /// The current item sits in a bounded group past its first member.
    pub can_step_back: bool,
    /// The current item belongs to a group with other members.
    pub has_group: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndAction {
    Close,
    Restart,
    /// Next-item resolution: queue, successor link, then polling.
    Advance,
    Shuffle,
    StepBack,
    StopAndSuggest,
    /// Stop without touching the overlay.
    Stop,
}

pub fn resolve_end(facts: &EndFacts) -> EndAction {
    if facts.finish_on_ended {
        return EndAction::Close;
    }
    if facts.loop_short {
        return EndAction::Restart;
    }

    match facts.policy {
        RepeatPolicy::One => EndAction::Restart,
        RepeatPolicy::Shuffle if facts.has_group => EndAction::Shuffle,
        RepeatPolicy::Shuffle => EndAction::Advance,
        RepeatPolicy::Pause | RepeatPolicy::List => {
            if facts.has_queued {
                EndAction::Advance
            } else {
                EndAction::StopAndSuggest
            }
        }
        RepeatPolicy::Close => {
            if facts.has_queued {
                EndAction::Advance
            } else if !facts.suggestions_shown && !facts.dialog_open {
                EndAction::Close
            } else {
                EndAction::Stop
            }
        }
        // Reverse stepping ends at the group's first item and then behaves
        // like All.
        RepeatPolicy::ReverseList if facts.can_step_back => EndAction::StepBack,
        RepeatPolicy::ReverseList | RepeatPolicy::All => EndAction::Advance,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn facts(policy: RepeatPolicy) -> EndFacts {
        EndFacts {
            policy,
            finish_on_ended: false,
            loop_short: false,
            has_queued: false,
            suggestions_shown: false,
            dialog_open: false,
            can_step_back: false,
            has_group: false,
        }
    }

    #[test]
    fn close_with_nothing_queued_closes() {
        assert_eq!(resolve_end(&facts(RepeatPolicy::Close)), EndAction::Close);
    }

    #[test]
    fn close_keeps_surface_open_while_a_dialog_is_up() {
        let with_dialog = EndFacts {
            dialog_open: true,
            ..facts(RepeatPolicy::Close)
        };
        assert_eq!(resolve_end(&with_dialog), EndAction::Stop);
    }

    #[test]
    fn close_advances_when_something_is_queued() {
        let queued = EndFacts {
            has_queued: true,
            ..facts(RepeatPolicy::Close)
        };
        assert_eq!(resolve_end(&queued), EndAction::Advance);
    }

    #[test]
    fn finish_on_ended_overrides_policy() {
        let finishing = EndFacts {
            finish_on_ended: true,
            ..facts(RepeatPolicy::One)
        };
        assert_eq!(resolve_end(&finishing), EndAction::Close);
    }

    #[test]
    fn shorts_loop_restarts() {
        let short = EndFacts {
            loop_short: true,
            ..facts(RepeatPolicy::All)
        };
        assert_eq!(resolve_end(&short), EndAction::Restart);
    }

    #[test]
    fn pause_without_queue_suggests() {
        assert_eq!(
            resolve_end(&facts(RepeatPolicy::Pause)),
            EndAction::StopAndSuggest
        );
    }

    #[test]
    fn reverse_list_falls_through_to_all_at_first_item() {
        let mid = EndFacts {
            can_step_back: true,
            ..facts(RepeatPolicy::ReverseList)
        };
        assert_eq!(resolve_end(&mid), EndAction::StepBack);
        assert_eq!(
            resolve_end(&facts(RepeatPolicy::ReverseList)),
            EndAction::Advance
        );
    }
}
