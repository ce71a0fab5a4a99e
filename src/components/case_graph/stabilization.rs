use super::options::PhysicsOptions;

/// Progress of the layout towards a converged state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Progress {
	/// Still moving; `iterations` solver steps run so far.
	Running { iterations: u32, total: u32 },
	/// Converged or out of iterations. Reported once.
	Done { iterations: u32, converged: bool },
	/// Nothing to report: already done or stabilization disabled.
	Idle,
}

/// Watches solver steps and decides when stabilization is over.
#[derive(Clone, Debug)]
pub struct Stabilizer {
	enabled: bool,
	min_velocity: f64,
	max_iterations: u32,
	iterations: u32,
	done: bool,
}

impl Stabilizer {
	pub fn new(physics: &PhysicsOptions) -> Self {
		Self {
			enabled: physics.stabilization.enabled,
			min_velocity: physics.min_velocity,
			max_iterations: physics.stabilization.iterations,
			iterations: 0,
			done: false,
		}
	}

	/// Records one solver step whose fastest node moved at `max_velocity`.
	pub fn record(&mut self, max_velocity: f64) -> Progress {
		if !self.enabled || self.done {
			return Progress::Idle;
		}
		self.iterations += 1;

		let converged = max_velocity < self.min_velocity;
		if converged || self.iterations >= self.max_iterations {
			self.done = true;
			return Progress::Done {
				iterations: self.iterations,
				converged,
			};
		}
		Progress::Running {
			iterations: self.iterations,
			total: self.max_iterations,
		}
	}

	pub fn is_done(&self) -> bool {
		self.done
	}

	pub fn iterations(&self) -> u32 {
		self.iterations
	}
}
