use async_trait::async_trait;
use chrono::Duration;
use std::sync::Arc;

use quiz_core::model::{
    AccountRef, PasswordHash, Question, QuizSettings, ScoreRecord, SessionId, Username,
};
use quiz_core::time::{fixed_clock, fixed_now};
use quiz_core::{DrawOrder, QuestionBank};
use services::{
    QuizEngine, QuizError, QuizPhase, QuizServices, ScoreCommitter, ServicesError,
    SessionRegistry,
};
use storage::repository::{
    AccountService, InMemoryRepository, NewAccountRecord, Storage, StorageError, UserStore,
};

/// Question `i` is answered correctly by option `i % 2`.
fn bank(n: usize) -> QuestionBank {
    QuestionBank::new(
        (0..n)
            .map(|i| {
                Question::new(format!("Q{i}"), vec!["a".into(), "b".into(), "c".into()], i % 2)
                    .unwrap()
            })
            .collect(),
    )
}

fn settings(per_quiz: u32) -> QuizSettings {
    QuizSettings::new(per_quiz, 10, Duration::minutes(30)).unwrap()
}

fn quiz_services(per_quiz: u32) -> QuizServices {
    QuizServices::in_memory(bank(8), settings(per_quiz), fixed_clock(), DrawOrder::Sequential)
        .unwrap()
}

fn sid(raw: &str) -> SessionId {
    SessionId::parse(raw).unwrap()
}

struct FailingScores;

#[async_trait]
impl UserStore for FailingScores {
    async fn store_score(&self, _record: &ScoreRecord) -> Result<i64, StorageError> {
        Err(StorageError::Connection("disk on fire".into()))
    }

    async fn top_scores(&self, _limit: u32) -> Result<Vec<ScoreRecord>, StorageError> {
        Ok(Vec::new())
    }
}

#[tokio::test]
async fn anonymous_quiz_scores_and_rejects_duplicate_answers() {
    let svc = quiz_services(5);
    let engine = svc.engine();
    let id = sid("alice-session");

    let started = engine.start_anonymous(id.clone(), "alice").await.unwrap();
    assert_eq!(started.phase, QuizPhase::Started);

    let views = engine.assign_questions(&id).await.unwrap();
    assert_eq!(views.len(), 5);

    let first = engine.validate_answer(&id, 0, 0).await.unwrap();
    assert!(first.correct);
    assert_eq!(first.current_score, 1);
    assert_eq!(first.answered, 1);

    let err = engine.validate_answer(&id, 0, 0).await.unwrap_err();
    assert!(matches!(err, QuizError::DuplicateAnswer { number: 0 }));

    let snap = engine.snapshot(&id).await.unwrap();
    assert_eq!(snap.score, 1);
    assert_eq!(snap.answered, 1);
    assert_eq!(snap.phase, QuizPhase::Answering);
}

#[tokio::test]
async fn answering_before_assignment_is_rejected() {
    let svc = quiz_services(3);
    let engine = svc.engine();
    let id = sid("early");
    engine.start_anonymous(id.clone(), "eager").await.unwrap();

    let err = engine.validate_answer(&id, 0, 0).await.unwrap_err();
    assert!(matches!(err, QuizError::QuestionsNotAssigned));
}

#[tokio::test]
async fn operations_on_unknown_sessions_fail() {
    let svc = quiz_services(3);
    let engine = svc.engine();
    let id = sid("ghost");

    assert!(matches!(
        engine.assign_questions(&id).await.unwrap_err(),
        QuizError::SessionNotFound
    ));
    assert!(matches!(
        engine.validate_answer(&id, 0, 0).await.unwrap_err(),
        QuizError::SessionNotFound
    ));
    assert!(matches!(
        svc.committer().finalize(&id).await.unwrap_err(),
        QuizError::SessionNotFound
    ));
}

#[tokio::test]
async fn questions_are_assigned_once() {
    let svc = quiz_services(3);
    let engine = svc.engine();
    let id = sid("twice");
    engine.start_anonymous(id.clone(), "bob").await.unwrap();

    engine.assign_questions(&id).await.unwrap();
    assert!(matches!(
        engine.assign_questions(&id).await.unwrap_err(),
        QuizError::AlreadyAssigned
    ));
}

#[tokio::test]
async fn blank_display_name_is_rejected() {
    let svc = quiz_services(3);
    let err = svc
        .engine()
        .start_anonymous(sid("blank"), "   ")
        .await
        .unwrap_err();
    assert!(matches!(err, QuizError::InvalidDisplayName(_)));
    assert!(svc.registry().is_empty().unwrap());
}

#[tokio::test]
async fn second_start_for_same_session_is_duplicate() {
    let svc = quiz_services(3);
    let engine = svc.engine();
    engine.start_anonymous(sid("dup"), "bob").await.unwrap();
    assert!(matches!(
        engine.start_anonymous(sid("dup"), "bob").await.unwrap_err(),
        QuizError::DuplicateSession
    ));
}

#[tokio::test]
async fn out_of_range_question_number_is_rejected() {
    let svc = quiz_services(3);
    let engine = svc.engine();
    let id = sid("range");
    engine.start_anonymous(id.clone(), "bob").await.unwrap();
    engine.assign_questions(&id).await.unwrap();

    assert!(matches!(
        engine.validate_answer(&id, 3, 0).await.unwrap_err(),
        QuizError::QuestionIndexOutOfRange { number: 3, total: 3 }
    ));
}

#[tokio::test]
async fn answering_every_question_completes_the_quiz() {
    let svc = quiz_services(4);
    let engine = svc.engine();
    let id = sid("finisher");
    engine.start_anonymous(id.clone(), "carol").await.unwrap();
    engine.assign_questions(&id).await.unwrap();

    let mut last = None;
    for number in 0..4 {
        // Correct on even questions only.
        last = Some(engine.validate_answer(&id, number, 0).await.unwrap());
    }
    let last = last.unwrap();
    assert!(last.complete);
    assert_eq!(last.current_score, 2);

    let snap = engine.snapshot(&id).await.unwrap();
    assert_eq!(snap.phase, QuizPhase::Completed);
    assert_eq!(snap.completed_at, Some(fixed_now()));
}

#[tokio::test]
async fn sessions_score_independently() {
    let svc = quiz_services(3);
    let engine = svc.engine();
    let (s1, s2) = (sid("s1"), sid("s2"));
    engine.start_anonymous(s1.clone(), "one").await.unwrap();
    engine.start_anonymous(s2.clone(), "two").await.unwrap();
    engine.assign_questions(&s1).await.unwrap();
    engine.assign_questions(&s2).await.unwrap();

    engine.validate_answer(&s1, 0, 0).await.unwrap();
    engine.validate_answer(&s1, 1, 1).await.unwrap();
    engine.validate_answer(&s2, 0, 2).await.unwrap();

    assert_eq!(engine.snapshot(&s1).await.unwrap().score, 2);
    assert_eq!(engine.snapshot(&s2).await.unwrap().score, 0);
}

#[tokio::test]
async fn concurrent_answers_to_one_question_count_once() {
    let svc = quiz_services(3);
    let engine = svc.engine();
    let id = sid("racer");
    engine.start_anonymous(id.clone(), "racer").await.unwrap();
    engine.assign_questions(&id).await.unwrap();

    let tasks: Vec<_> = (0..8)
        .map(|_| {
            let engine = Arc::clone(&engine);
            let id = id.clone();
            tokio::spawn(async move { engine.validate_answer(&id, 0, 0).await })
        })
        .collect();

    let mut accepted = 0;
    for task in tasks {
        match task.await.unwrap() {
            Ok(_) => accepted += 1,
            Err(QuizError::DuplicateAnswer { number: 0 }) => {}
            Err(other) => panic!("unexpected error: {other}"),
        }
    }
    assert_eq!(accepted, 1);
    let snap = engine.snapshot(&id).await.unwrap();
    assert_eq!((snap.score, snap.answered), (1, 1));
}

#[tokio::test]
async fn finalize_stores_score_and_evicts() {
    let svc = quiz_services(2);
    let engine = svc.engine();
    let id = sid("done");
    engine.start_anonymous(id.clone(), "dora").await.unwrap();
    engine.assign_questions(&id).await.unwrap();
    engine.validate_answer(&id, 0, 0).await.unwrap();
    engine.validate_answer(&id, 1, 1).await.unwrap();

    let result = svc.committer().finalize(&id).await.unwrap();
    assert_eq!(result.score, 2);
    assert_eq!(result.total_questions, 2);
    assert!(result.completed);
    assert_eq!(result.player.name(), "dora");

    assert!(matches!(
        engine.snapshot(&id).await.unwrap_err(),
        QuizError::SessionNotFound
    ));

    let board = svc.leaderboard().top(None).await.unwrap();
    assert_eq!(board.len(), 1);
    assert_eq!(board[0].player, "dora");
    assert!(board[0].anonymous);
}

#[tokio::test]
async fn finalize_evicts_even_when_store_fails() {
    let clock = fixed_clock();
    let registry = Arc::new(SessionRegistry::new(clock));
    let storage = Storage::in_memory();
    let engine = QuizEngine::new(
        clock,
        Arc::clone(&registry),
        Arc::new(bank(4)),
        storage.accounts,
        &settings(2),
    )
    .with_draw_order(DrawOrder::Sequential);
    let committer = ScoreCommitter::new(clock, Arc::clone(&registry), Arc::new(FailingScores));

    let id = sid("unlucky");
    engine.start_anonymous(id.clone(), "unlucky").await.unwrap();
    engine.assign_questions(&id).await.unwrap();

    let err = committer.finalize(&id).await.unwrap_err();
    assert!(matches!(
        err,
        QuizError::PersistenceFailed(StorageError::Connection(_))
    ));
    assert!(registry.is_empty().unwrap());
    assert!(matches!(
        registry.get(&id).unwrap_err(),
        QuizError::SessionNotFound
    ));
}

#[tokio::test]
async fn login_starts_an_authenticated_quiz() {
    let repo = InMemoryRepository::new();
    let account = repo
        .insert_account(NewAccountRecord {
            username: Username::parse("erin").unwrap(),
            password: PasswordHash::derive("hunter22"),
            created_at: fixed_now(),
        })
        .await
        .unwrap();
    let storage = Storage {
        accounts: Arc::new(repo.clone()),
        scores: Arc::new(repo),
    };
    let svc = QuizServices::new(
        &storage,
        bank(4),
        settings(2),
        fixed_clock(),
        DrawOrder::Sequential,
    )
    .unwrap();
    let engine = svc.engine();

    let err = engine
        .login(sid("bad"), "erin", "wrong123")
        .await
        .unwrap_err();
    assert!(matches!(err, QuizError::AuthenticationFailed));
    assert!(svc.registry().is_empty().unwrap());

    let snap = engine.login(sid("good"), "erin", "hunter22").await.unwrap();
    assert_eq!(snap.player.account(), Some(account));
    assert!(!snap.player.is_anonymous());

    engine.assign_questions(&sid("good")).await.unwrap();
    let stored = svc.committer().finalize(&sid("good")).await.unwrap();
    assert_eq!(stored.player.account(), Some(AccountRef::new(1)));
    assert!(!stored.completed);
}

#[tokio::test]
async fn idle_sessions_are_evicted() {
    let svc = quiz_services(2);
    let engine = svc.engine();
    engine.start_anonymous(sid("idle"), "idle").await.unwrap();

    assert_eq!(svc.evict_idle().unwrap(), 0);

    let later = fixed_now() + Duration::minutes(31);
    let evicted = svc
        .registry()
        .evict_idle_at(later, svc.settings().session_idle_timeout())
        .unwrap();
    assert_eq!(evicted, 1);
    assert!(matches!(
        engine.snapshot(&sid("idle")).await.unwrap_err(),
        QuizError::SessionNotFound
    ));
}

#[test]
fn bank_smaller_than_a_quiz_is_rejected() {
    let err = QuizServices::in_memory(bank(2), settings(5), fixed_clock(), DrawOrder::Shuffled)
        .err()
        .unwrap();
    assert!(matches!(
        err,
        ServicesError::BankTooSmall {
            required: 5,
            available: 2
        }
    ));
}
