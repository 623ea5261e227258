use anyhow::Result;
use border_per::{
    ExperienceBufferBase, PerConfig, PerError, PrioritizedReplayBuffer,
    PrioritizedReplayBufferConfig, ReplayBufferBase, Transition,
};
use rand::{rngs::StdRng, Rng, SeedableRng};

type Obs = Vec<f32>;
type Act = usize;
type Tr = Transition<Obs, Act>;

const CAPACITY: usize = 256;
const BATCH_SIZE: usize = 32;
const N_STEPS: usize = 2000;
const EPSILON_PER: f32 = 1e-6;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn transition(t: usize) -> Tr {
    Transition::new(
        vec![t as f32; 4],
        t % 3,
        (t % 7) as f32,
        vec![(t + 1) as f32; 4],
        t % 50 == 49,
    )
}

/// Drives the buffer the way a DQN training loop does: push one transition
/// per step, skip optimization until enough samples exist, then sample,
/// compute fake TD errors, and feed back priorities.
#[test]
fn test_dqn_like_loop() -> Result<()> {
    init_logger();

    let config = PrioritizedReplayBufferConfig::default()
        .capacity(CAPACITY)
        .seed(1)
        .per_config(PerConfig::default().n_opts_final(N_STEPS));
    let mut buffer = PrioritizedReplayBuffer::<Tr>::build(&config)?;
    let mut rng = StdRng::seed_from_u64(2);
    let mut n_opts = 0;

    for t in 0..N_STEPS {
        buffer.push(transition(t))?;

        let batch = match buffer.batch(BATCH_SIZE) {
            Ok(batch) => batch,
            Err(err) => match err.downcast_ref::<PerError>() {
                Some(e) if e.is_recoverable() => continue,
                _ => return Err(err),
            },
        };
        assert!(t + 1 >= BATCH_SIZE);
        assert_eq!(batch.len(), BATCH_SIZE);
        assert_eq!(batch.weights.iter().cloned().fold(f32::MIN, f32::max), 1.0);

        for (tr, &ix) in batch.transitions.iter().zip(batch.slot_indices.iter()) {
            assert_eq!(Some(tr), buffer.get(ix));
        }

        let td_errs = (0..BATCH_SIZE)
            .map(|_| rng.gen_range(-2.0f32..2.0))
            .collect::<Vec<_>>();
        buffer.update_priority(&batch.slot_indices, &td_errs)?;
        n_opts += 1;
    }

    assert_eq!(ExperienceBufferBase::len(&buffer), CAPACITY);
    assert_eq!(n_opts, N_STEPS - BATCH_SIZE + 1);
    assert!(buffer.beta() > 0.99);

    // The root of the sum tree still matches the sum of the leaves.
    let leaves: f32 = (0..CAPACITY).filter_map(|slot| buffer.priority(slot)).sum();
    let total = buffer.total_priority();
    assert!((total - leaves).abs() < 1e-3 * total.max(1.0));

    // The latest transitions are kept, oldest overwritten first.
    for t in N_STEPS - CAPACITY..N_STEPS {
        assert_eq!(buffer.get(t % CAPACITY), Some(&transition(t)));
    }
    Ok(())
}

#[test]
fn test_priorities_steer_sampling() -> Result<()> {
    init_logger();

    let config = PrioritizedReplayBufferConfig::default()
        .capacity(4)
        .per_config(PerConfig::default().alpha(1.0));
    let mut buffer = PrioritizedReplayBuffer::<Tr>::new(&config)?;
    for t in 0..4 {
        buffer.add(transition(t))?;
    }

    let batch = buffer.sample(4, 1.0)?;
    assert_eq!(batch.slot_indices, vec![0, 1, 2, 3]);

    buffer.update_priorities(&[0, 1, 2, 3], &[0.1, 0.1, 0.1, 100.0])?;
    let n_draws = 5000;
    let mut n_slot_3 = 0;
    for _ in 0..n_draws {
        let (transitions, slots, weights) = buffer.sample(1, 1.0)?.unpack();
        assert_eq!(weights, vec![1.0]);
        if slots[0] == 3 {
            assert_eq!(transitions[0], transition(3));
            n_slot_3 += 1;
        }
    }
    assert!(n_slot_3 as f32 / n_draws as f32 > 0.99);

    // A fresh transition overwrites slot 0 with the maximum priority seen.
    buffer.add(transition(4))?;
    assert_eq!(buffer.priority(0), Some(100.0));
    Ok(())
}

#[test]
fn test_td_errors_are_floored() -> Result<()> {
    init_logger();

    let config = PrioritizedReplayBufferConfig::default()
        .capacity(2)
        .per_config(PerConfig::default().alpha(1.0).epsilon(EPSILON_PER));
    let mut buffer = PrioritizedReplayBuffer::<Tr>::new(&config)?;
    buffer.add(transition(0))?;
    buffer.add(transition(1))?;

    // Zero TD error still leaves a nonzero sampling probability.
    buffer.update_priority(&[0, 1], &[0.0, 0.0])?;
    assert_eq!(buffer.priority(0), Some(EPSILON_PER));
    let batch = buffer.sample(2, 0.5)?;
    assert_eq!(batch.slot_indices, vec![0, 1]);

    let err = buffer.update_priority(&[0], &[0.0, 1.0]).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<PerError>(),
        Some(PerError::MismatchedUpdateLengths { .. })
    ));
    Ok(())
}
