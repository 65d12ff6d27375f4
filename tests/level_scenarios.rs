use std::sync::Arc;

use balancerio::sim::{
    BalanceClass, GameEvent, Intent, LevelSet, Phase, Rejection, Session, TemplateKey, classify,
    solve, update,
};
use proptest::prelude::*;

fn new_session() -> Session {
    Session::new(Arc::new(LevelSet::bundled().unwrap()))
}

fn key(id: &str) -> TemplateKey {
    TemplateKey::Id(id.to_string())
}

fn place(cell: i32, id: &str) -> Intent {
    Intent::Place {
        cell,
        template: key(id),
    }
}

fn run(session: Session, intents: &[Intent]) -> (Session, Vec<GameEvent>) {
    let mut session = session;
    let mut events = Vec::new();
    for intent in intents {
        let t = update(session, intent);
        session = t.session;
        events.extend(t.events);
    }
    (session, events)
}

/// Solve whatever level the session is on
fn solve_current(session: Session) -> Session {
    let solution = solve(session.level()).expect("bundled level is solvable");
    let intents: Vec<Intent> = solution.intents().collect();
    run(session, &intents).0
}

fn go_to_level(index: usize) -> Session {
    let mut session = new_session();
    while session.level_index() < index {
        session = solve_current(session);
        session = update(session, &Intent::NextLevel).session;
    }
    session
}

#[test]
fn scenario_a_matching_moment_solves_level_one() {
    let (s, events) = run(new_session(), &[place(-2, "c2")]);
    let m = s.moments();
    assert_eq!(m.left, 4.0);
    assert_eq!(m.right, 4.0);
    assert_eq!(m.difference, 0.0);
    assert_eq!(s.phase(), Phase::Solved { level: 0 });
    assert!(events.contains(&GameEvent::LevelSolved { level: 0 }));
}

#[test]
fn scenario_b_near_miss_is_close_not_solved() {
    let (s, _) = run(new_session(), &[place(-3, "c1")]);
    let m = s.moments();
    assert_eq!(m.left, 3.0);
    assert_eq!(m.right, 4.0);
    assert_eq!(m.difference, -1.0);
    assert_eq!(classify(m.difference), BalanceClass::Close);
    assert_eq!(s.phase(), Phase::Playing);
}

#[test]
fn scenario_c_sixth_piece_is_refused() {
    let s = go_to_level(3);
    assert_eq!(s.level_index(), 3);

    // All on the heavy side so the board never balances mid-way
    let intents: Vec<Intent> = [3, 3, 3, 1, 1].iter().map(|&c| place(c, "c1")).collect();
    let (s, _) = run(s, &intents);
    assert_eq!(s.phase(), Phase::Playing);
    assert_eq!(s.board().player_piece_count(), 5);
    assert_eq!(s.usage().used(&key("c1")), 5);

    let five = s.clone();
    let t = update(s, &place(1, "c1"));
    assert_eq!(
        t.events,
        vec![GameEvent::Rejected(Rejection::TemplateExhausted)]
    );
    assert_eq!(t.session, five);

    // Refusing again changes nothing either
    let t = update(t.session, &place(-3, "c1"));
    assert_eq!(t.session, five);
}

#[test]
fn scenario_d_reset_restores_static_layout() {
    let fresh = new_session();
    let (s, _) = run(
        fresh.clone(),
        &[place(-3, "c1"), place(3, "c2"), place(1, "c1")],
    );
    assert_eq!(s.board().player_piece_count(), 3);

    let (s, _) = run(s, &[Intent::Reset]);
    assert_eq!(s.usage().total(), 0);
    assert_eq!(s.board().player_piece_count(), 0);
    assert_eq!(s.board(), fresh.board());
    assert_eq!(s.board().cell(2).len(), 1);
    assert_eq!(s.board().cell(2)[0].piece().weight, 2.0);
}

/// Fixed pieces that already balance: 2 x 2 on each side
const PRE_BALANCED: &str = r##"[{
    "title": "Even", "description": "d", "hint": "h",
    "staticObjects": [
        {"type":"circle","size":"medium","weight":2,"position":-2,"color":"#fff"},
        {"type":"circle","size":"medium","weight":2,"position":2,"color":"#fff"}
    ],
    "inventory": [{"id":"c1","type":"circle","size":"small","weight":1,"color":"#fff","count":3}],
    "availableCells": [-3, -1, 1, 3]
}]"##;

#[test]
fn static_only_board_never_solves() {
    let levels = Arc::new(LevelSet::from_json(PRE_BALANCED).unwrap());
    let s = Session::new(levels);
    assert_eq!(s.moments().difference, 0.0);
    assert_eq!(s.phase(), Phase::Playing);

    let (s, events) = run(
        s,
        &[
            Intent::Reset,
            place(-1, "c1"),
            Intent::Remove { cell: -1, index: 0 },
        ],
    );
    assert_eq!(s.moments().difference, 0.0);
    assert!(!s.moments().has_user_pieces);
    assert_eq!(s.phase(), Phase::Playing);
    assert!(!events.iter().any(|e| matches!(e, GameEvent::LevelSolved { .. })));
    assert_eq!(
        events.last(),
        Some(&GameEvent::Removed {
            cell: -1,
            key: key("c1")
        })
    );
}

#[test]
fn rejected_intents_change_nothing() {
    let s = new_session();
    let before = s.clone();
    let (s, events) = run(
        s,
        &[
            Intent::Remove { cell: -1, index: 0 },
            Intent::Remove { cell: 2, index: 0 },
            place(0, "c1"),
            place(-2, "nope"),
            Intent::NextLevel,
            Intent::Finish,
            Intent::Restart,
        ],
    );
    assert_eq!(s, before);
    assert_eq!(
        events,
        vec![
            GameEvent::Rejected(Rejection::NothingToRemove),
            GameEvent::Rejected(Rejection::FixedPiece),
            GameEvent::Rejected(Rejection::CellUnavailable),
            GameEvent::Rejected(Rejection::UnknownTemplate),
            GameEvent::Rejected(Rejection::LevelUnsolved),
            GameEvent::Rejected(Rejection::LevelUnsolved),
            GameEvent::Rejected(Rejection::NotFinished),
        ]
    );
}

#[test]
fn full_playthrough_finish_and_restart() {
    let mut s = new_session();
    for level in 0..5 {
        assert_eq!(s.level_index(), level);
        s = solve_current(s);
        assert_eq!(s.phase(), Phase::Solved { level });
        let next = if s.is_last_level() {
            Intent::Finish
        } else {
            Intent::NextLevel
        };
        s = update(s, &next).session;
    }
    assert_eq!(s.phase(), Phase::AllComplete);

    let t = update(s, &Intent::NextLevel);
    assert_eq!(t.events, vec![GameEvent::Rejected(Rejection::NoNextLevel)]);

    let (s, events) = run(t.session, &[Intent::Restart]);
    assert_eq!(s.level_index(), 0);
    assert_eq!(s.phase(), Phase::Playing);
    assert_eq!(s.usage().total(), 0);
    assert_eq!(events, vec![GameEvent::LevelStarted { level: 0 }]);
}

#[test]
fn reset_is_available_after_completion() {
    let mut s = go_to_level(4);
    s = solve_current(s);
    s = update(s, &Intent::Finish).session;
    assert_eq!(s.phase(), Phase::AllComplete);

    let s = update(s, &Intent::Reset).session;
    assert_eq!(s.level_index(), 4);
    assert_eq!(s.phase(), Phase::Playing);
    assert_eq!(s.board().player_piece_count(), 0);
}

proptest! {
    /// Placing then removing the piece just added restores the session exactly
    #[test]
    fn place_then_remove_round_trips(
        setup in prop::collection::vec((prop_oneof![-3i32..=-1, 1i32..=3], 0usize..2), 0..4),
        cell in prop_oneof![-3i32..=-1, 1i32..=3],
        which in 0usize..2,
    ) {
        let ids = ["c1", "c2"];
        let intents: Vec<Intent> = setup.iter().map(|&(c, t)| place(c, ids[t])).collect();
        let (s, _) = run(new_session(), &intents);
        prop_assume!(s.phase() == Phase::Playing);

        let before = s.clone();
        let t = update(s, &place(cell, ids[which]));
        prop_assume!(t.session.phase() == Phase::Playing);
        prop_assume!(matches!(t.events.first(), Some(GameEvent::Placed { .. })));

        let last = t.session.board().cell(cell).len() - 1;
        let t = update(t.session, &Intent::Remove { cell, index: last });
        prop_assert_eq!(t.session, before);
    }
}
