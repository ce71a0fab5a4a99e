//! ForceAtlas2-style force model with explicit integration at a fixed timestep.
//!
//! Repulsion falls off linearly with distance and is scaled by the degree of
//! the node it acts on, springs pull connected nodes together and central
//! gravity is a linear pull towards the origin, also degree-weighted.

use super::options::PhysicsOptions;

const NODE_MASS: f64 = 1.0;
/// Per-axis velocity cap, keeps close encounters from flinging nodes away.
const MAX_VELOCITY: f64 = 50.0;
const MIN_DISTANCE: f64 = 0.1;

/// A node as seen by the solver.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Body {
	pub x: f64,
	pub y: f64,
	pub vx: f64,
	pub vy: f64,
	/// Number of edges plus one.
	pub degree: f64,
	/// Held in place, for instance while dragged.
	pub anchored: bool,
}

impl Body {
	pub fn at(x: f64, y: f64) -> Self {
		Self {
			x,
			y,
			degree: 1.0,
			..Self::default()
		}
	}
}

fn clamp_velocity(v: f64) -> f64 {
	v.clamp(-MAX_VELOCITY, MAX_VELOCITY)
}

/// Accumulated force on every body.
pub fn forces(bodies: &[Body], springs: &[(usize, usize)], physics: &PhysicsOptions) -> Vec<(f64, f64)> {
	let solver = &physics.force_atlas2_based;
	let mut forces = vec![(0.0, 0.0); bodies.len()];

	for (i, a) in bodies.iter().enumerate() {
		for (j, b) in bodies.iter().enumerate().skip(i + 1) {
			let (mut dx, mut dy) = (a.x - b.x, a.y - b.y);
			let mut distance = (dx * dx + dy * dy).sqrt();
			if distance < MIN_DISTANCE {
				// coincident nodes split along x
				(dx, dy, distance) = (MIN_DISTANCE, 0.0, MIN_DISTANCE);
			}
			let repulsion = -solver.gravitational_constant * NODE_MASS * NODE_MASS / (distance * distance);
			forces[i].0 += dx * repulsion * a.degree;
			forces[i].1 += dy * repulsion * a.degree;
			forces[j].0 -= dx * repulsion * b.degree;
			forces[j].1 -= dy * repulsion * b.degree;
		}
	}

	for &(a, b) in springs {
		if a == b {
			continue;
		}
		let (Some(from), Some(to)) = (bodies.get(a), bodies.get(b)) else {
			continue;
		};
		let (dx, dy) = (to.x - from.x, to.y - from.y);
		let distance = (dx * dx + dy * dy).sqrt();
		if distance < MIN_DISTANCE {
			continue;
		}
		let pull = solver.spring_constant * (distance - solver.spring_length) / distance;
		forces[a].0 += dx * pull;
		forces[a].1 += dy * pull;
		forces[b].0 -= dx * pull;
		forces[b].1 -= dy * pull;
	}

	for (force, body) in forces.iter_mut().zip(bodies) {
		let gravity = solver.central_gravity * body.degree * NODE_MASS;
		force.0 -= body.x * gravity;
		force.1 -= body.y * gravity;
	}
	forces
}

/// Advances every body by one `timestep`. Returns the fastest node speed.
pub fn step(bodies: &mut [Body], springs: &[(usize, usize)], physics: &PhysicsOptions) -> f64 {
	let dt = physics.timestep;
	let damping = physics.force_atlas2_based.damping;
	let forces = forces(bodies, springs, physics);

	let mut max_velocity: f64 = 0.0;
	for (body, (fx, fy)) in bodies.iter_mut().zip(forces) {
		if body.anchored {
			body.vx = 0.0;
			body.vy = 0.0;
			continue;
		}
		body.vx = clamp_velocity(body.vx + (fx - damping * body.vx) / NODE_MASS * dt);
		body.vy = clamp_velocity(body.vy + (fy - damping * body.vy) / NODE_MASS * dt);
		body.x += body.vx * dt;
		body.y += body.vy * dt;
		max_velocity = max_velocity.max((body.vx * body.vx + body.vy * body.vy).sqrt());
	}
	max_velocity
}

#[cfg(test)]
mod tests {
	use super::*;

	fn distance(a: &Body, b: &Body) -> f64 {
		((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt()
	}

	fn settle(bodies: &mut [Body], springs: &[(usize, usize)]) -> usize {
		let physics = PhysicsOptions::default();
		for i in 1..=1000 {
			if step(bodies, springs, &physics) < physics.min_velocity {
				return i;
			}
		}
		1000
	}

	#[test]
	fn free_nodes_push_each_other_apart() {
		let bodies = [Body::at(-1.0, 0.0), Body::at(1.0, 0.0)];
		let f = forces(&bodies, &[], &PhysicsOptions::default());
		assert!(f[0].0 < 0.0);
		assert!(f[1].0 > 0.0);
		assert_eq!(f[0].1, 0.0);
	}

	#[test]
	fn coincident_nodes_separate() {
		let mut bodies = [Body::at(5.0, 5.0), Body::at(5.0, 5.0)];
		step(&mut bodies, &[], &PhysicsOptions::default());
		assert!(distance(&bodies[0], &bodies[1]) > 1.0);
		assert!(bodies.iter().all(|b| b.x.is_finite() && b.y.is_finite()));
	}

	#[test]
	fn self_loop_spring_is_ignored() {
		let bodies = [Body::at(30.0, 0.0)];
		let physics = PhysicsOptions::default();
		assert_eq!(forces(&bodies, &[(0, 0)], &physics), forces(&bodies, &[], &physics));
	}

	#[test]
	fn anchored_body_stays_put() {
		let mut bodies = [
			Body {
				anchored: true,
				..Body::at(10.0, 0.0)
			},
			Body::at(12.0, 0.0),
		];
		step(&mut bodies, &[(0, 1)], &PhysicsOptions::default());
		assert_eq!((bodies[0].x, bodies[0].y), (10.0, 0.0));
		assert!(bodies[1].x > 12.0);
	}

	#[test]
	fn velocity_is_capped() {
		let mut bodies = [Body::at(0.0, 0.0), Body::at(0.2, 0.0)];
		let v = step(&mut bodies, &[], &PhysicsOptions::default());
		assert!(v <= MAX_VELOCITY * 2f64.sqrt());
	}

	#[test]
	fn connected_pair_settles_near_the_origin() {
		let mut bodies = [
			Body {
				degree: 2.0,
				..Body::at(100.0, 0.0)
			},
			Body {
				degree: 2.0,
				..Body::at(-100.0, 0.0)
			},
		];
		let steps = settle(&mut bodies, &[(0, 1)]);
		assert!(steps < 1000, "did not converge");
		// repulsion 2G/d balances spring k*d plus gravity 2c*d/2 at d ~ 75
		let d = distance(&bodies[0], &bodies[1]);
		assert!((60.0..90.0).contains(&d), "distance {d}");
		assert!(bodies[0].x.abs() < 60.0 && bodies[1].x.abs() < 60.0);
	}

	#[test]
	fn springs_hold_neighbours_closer_than_strangers() {
		// 0-1 connected, 2 isolated
		let mut bodies = [
			Body {
				degree: 2.0,
				..Body::at(100.0, 0.0)
			},
			Body {
				degree: 2.0,
				..Body::at(-50.0, 86.0)
			},
			Body::at(-50.0, -86.0),
		];
		settle(&mut bodies, &[(0, 1)]);
		let linked = distance(&bodies[0], &bodies[1]);
		assert!(linked < distance(&bodies[0], &bodies[2]));
		assert!(linked < distance(&bodies[1], &bodies[2]));
	}
}
