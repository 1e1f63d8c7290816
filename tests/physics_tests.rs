use approx::assert_relative_eq;
use boxphys::collision::detect;
use boxphys::error::PhysicsError;
use boxphys::math::Vector3;
use boxphys::{Environment, EnvironmentConfig, RigidBody};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::FRAC_PI_4;

const SQRT_2: f32 = std::f32::consts::SQRT_2;

fn unit_box_at(position: Vector3) -> RigidBody {
    let mut body = RigidBody::new();
    body.set_position(position);
    body
}

#[test]
fn test_rigid_body_defaults() {
    let body = RigidBody::new();

    assert_eq!(body.get_position(), Vector3::zero());
    assert_eq!(body.get_half_extent(), Vector3::one());
    assert_eq!(body.get_inverse_mass(), 1.0);
    assert!(body.get_linear_velocity().is_zero());
    assert!(body.get_angular_velocity().is_zero());
    assert!(!body.is_fixed());
    assert!(!body.is_auto_sleep());
    assert!(!body.is_sleeping());
}

#[test]
fn test_shape_parameter_derives_inertia() {
    let mut body = RigidBody::new();
    body.set_shape_parameter(2.0, 1.0, 2.0, 3.0, 0.3, 0.6).unwrap();

    assert_relative_eq!(body.get_inverse_mass(), 0.5);
    assert_eq!(body.get_half_extent(), Vector3::new(1.0, 2.0, 3.0));
    assert_relative_eq!(body.get_restitution(), 0.3);
    assert_relative_eq!(body.get_friction(), 0.6);

    // Uniform box inertia: I_x = m (hy^2 + hz^2) / 3, and the stored
    // tensor is its inverse
    let inv_inertia = body.get_inverse_inertia();
    assert_relative_eq!(inv_inertia.data[0][0], 3.0 / (2.0 * 13.0), epsilon = 1.0e-6);
    assert_relative_eq!(inv_inertia.data[1][1], 3.0 / (2.0 * 10.0), epsilon = 1.0e-6);
    assert_relative_eq!(inv_inertia.data[2][2], 3.0 / (2.0 * 5.0), epsilon = 1.0e-6);
    assert_relative_eq!(inv_inertia.data[0][1], 0.0);
}

#[test]
fn test_shape_parameter_rejects_non_positive_values() {
    let mut body = RigidBody::new();

    match body.set_shape_parameter(0.0, 1.0, 1.0, 1.0, 0.5, 0.5) {
        Err(PhysicsError::InvalidParameter(_)) => {}
        other => panic!("expected InvalidParameter, got {:?}", other),
    }
    assert!(body.set_shape_parameter(1.0, -1.0, 1.0, 1.0, 0.5, 0.5).is_err());
    assert!(body.set_shape_parameter(1.0, 1.0, 0.0, 1.0, 0.5, 0.5).is_err());

    // A rejected call leaves the body untouched
    assert_eq!(body.get_inverse_mass(), 1.0);
    assert_eq!(body.get_half_extent(), Vector3::one());

    assert!(body.set_shape_parameter(2.0, 1.0, 1.0, 1.0, 0.5, 0.5).is_ok());
    assert_relative_eq!(body.get_inverse_mass(), 0.5);
}

#[test]
fn test_full_overlap_is_detected() {
    let box0 = unit_box_at(Vector3::zero());
    let box1 = unit_box_at(Vector3::zero());

    let contact = detect(&box0, &box1).unwrap();
    assert!(contact.penetration > 0.0);
    assert_relative_eq!(contact.normal.length(), 1.0, epsilon = 1.0e-5);
}

#[test]
fn test_face_contact_normal() {
    let box0 = unit_box_at(Vector3::new(-1.0, 0.0, 0.0));
    let box1 = unit_box_at(Vector3::new(1.0 - 0.0001, 0.0, 0.0));

    let contact = detect(&box0, &box1).unwrap();

    // Overlap is the tiny slab the boxes share on the x axis
    assert_relative_eq!(contact.penetration, 0.0001, epsilon = 1.0e-5);

    // Normal is (anti)parallel to x and points from box1 toward box0
    assert_relative_eq!(contact.normal.x, -1.0, epsilon = 1.0e-5);
    assert_relative_eq!(contact.normal.y, 0.0, epsilon = 1.0e-5);
    assert_relative_eq!(contact.normal.z, 0.0, epsilon = 1.0e-5);
}

#[test]
fn test_corner_overlap_of_rotated_boxes_is_detected() {
    // Both boxes rotated 45 degrees about y, barely touching corners
    let mut box0 = unit_box_at(Vector3::new(-1.41421, 0.0, 0.0));
    box0.set_orientation_from_euler(0.0, FRAC_PI_4, 0.0);
    let mut box1 = unit_box_at(Vector3::new(1.41421, 0.0, 0.0));
    box1.set_orientation_from_euler(0.0, FRAC_PI_4, 0.0);

    let contact = detect(&box0, &box1).unwrap();
    assert!(contact.penetration > 0.0);
}

#[test]
fn test_crossing_edges_contact() {
    // Two edges crossing like an X: box0 tilted about x offers its top
    // edge (along x), box1 tilted about y offers its bottom edge
    // (along y), overlapping by 0.2 on the z axis.
    let distance = 2.0 * SQRT_2 - 0.2;

    let mut box0 = unit_box_at(Vector3::zero());
    box0.set_orientation_from_euler(FRAC_PI_4, 0.0, 0.0);
    let mut box1 = unit_box_at(Vector3::new(0.0, 0.0, distance));
    box1.set_orientation_from_euler(0.0, FRAC_PI_4, 0.0);

    let contact = detect(&box0, &box1).unwrap();

    // Edge-edge penetration is half the axis overlap, and the contact
    // point sits midway between the two edges
    assert_relative_eq!(contact.penetration, 0.1, epsilon = 1.0e-3);
    assert_relative_eq!(contact.normal.z, -1.0, epsilon = 1.0e-3);
    assert_relative_eq!(contact.position.x, 0.0, epsilon = 1.0e-3);
    assert_relative_eq!(contact.position.y, 0.0, epsilon = 1.0e-3);
    assert_relative_eq!(contact.position.z, distance / 2.0, epsilon = 1.0e-3);
}

#[test]
fn test_separated_boxes_produce_no_contact() {
    let box0 = unit_box_at(Vector3::zero());
    let box1 = unit_box_at(Vector3::new(5.0, 0.0, 0.0));
    assert!(detect(&box0, &box1).is_none());

    // Touching within tolerance still counts as separated
    let box2 = unit_box_at(Vector3::new(2.0, 0.0, 0.0));
    assert!(detect(&box0, &box2).is_none());
}

#[test]
fn test_normal_points_toward_first_body() {
    // Random overlapping configurations must all satisfy the normal
    // orientation convention
    let mut rng = StdRng::seed_from_u64(42);
    let mut checked = 0;

    for _ in 0..300 {
        let mut box0 = unit_box_at(Vector3::new(
            rng.gen_range(-1.5..1.5),
            rng.gen_range(-1.5..1.5),
            rng.gen_range(-1.5..1.5),
        ));
        box0.set_orientation_from_euler(
            rng.gen_range(-1.5..1.5),
            rng.gen_range(-1.5..1.5),
            rng.gen_range(-1.5..1.5),
        );

        let mut box1 = unit_box_at(Vector3::new(
            rng.gen_range(-1.5..1.5),
            rng.gen_range(-1.5..1.5),
            rng.gen_range(-1.5..1.5),
        ));
        box1.set_orientation_from_euler(
            rng.gen_range(-1.5..1.5),
            rng.gen_range(-1.5..1.5),
            rng.gen_range(-1.5..1.5),
        );

        if let Some(contact) = detect(&box0, &box1) {
            let toward_first = box0.get_position() - box1.get_position();
            assert!(contact.normal.dot(&toward_first) >= -1.0e-4);
            assert!(contact.penetration > 0.0);
            assert_relative_eq!(contact.normal.length(), 1.0, epsilon = 1.0e-4);
            checked += 1;
        }
    }

    // The sampling volume guarantees plenty of overlapping pairs
    assert!(checked > 50);
}

#[test]
fn test_free_fall() {
    let mut env = Environment::new();
    let handle = env.register(unit_box_at(Vector3::new(0.0, 20.0, 0.0)));

    // Forces are cleared after every update, so gravity is re-applied
    // each frame
    for _ in 0..120 {
        env.get_body_mut(handle)
            .unwrap()
            .add_force(Vector3::new(0.0, -10.0, 0.0));
        env.update(1.0 / 60.0, 5);
    }

    let body = env.get_body(handle).unwrap();
    assert!(body.get_position().y.abs() <= 0.05);
    assert_relative_eq!(body.get_linear_velocity().y, -20.0, epsilon = 1.0e-3);
}

#[test]
fn test_body_falls_onto_fixed_floor() {
    let mut env = Environment::new();

    let mut floor = RigidBody::new();
    floor.set_shape_parameter(1000.0, 20.0, 1.0, 20.0, 0.1, 0.8).unwrap();
    floor.set_position(Vector3::new(0.0, -1.0, 0.0));
    floor.set_fixed(true);
    let floor_handle = env.register(floor);

    let mut falling = unit_box_at(Vector3::new(0.0, 3.0, 0.0));
    falling.set_shape_parameter(1.0, 1.0, 1.0, 1.0, 0.1, 0.8).unwrap();
    let body_handle = env.register(falling);

    for _ in 0..240 {
        env.get_body_mut(body_handle)
            .unwrap()
            .add_force(Vector3::new(0.0, -10.0, 0.0));
        env.update(1.0 / 60.0, 5);
    }

    // The floor never moves
    let floor = env.get_body(floor_handle).unwrap();
    assert_eq!(floor.get_position(), Vector3::new(0.0, -1.0, 0.0));
    assert!(floor.get_linear_velocity().is_zero());

    // The falling box is held above the floor instead of tunneling
    // through it (floor top at y = 0, box resting center near y = 1)
    let body = env.get_body(body_handle).unwrap();
    assert!(body.get_position().y > 0.0);
    assert!(body.get_position().y < 3.0);
}

#[test]
fn test_head_on_collision_conserves_momentum() {
    let mut env = Environment::new();

    let mut mover = unit_box_at(Vector3::new(-2.2, 0.0, 0.0));
    mover.set_linear_velocity(Vector3::new(2.0, 0.0, 0.0));
    let mover_handle = env.register(mover);
    let target_handle = env.register(unit_box_at(Vector3::zero()));

    for _ in 0..60 {
        env.update(1.0 / 60.0, 1);
    }

    let v0 = env.get_body(mover_handle).unwrap().get_linear_velocity();
    let v1 = env.get_body(target_handle).unwrap().get_linear_velocity();

    // Equal masses: the impulse transfers momentum without creating any
    assert_relative_eq!(v0.x + v1.x, 2.0, epsilon = 1.0e-3);
    assert!(v1.x > v0.x);
    assert!(v1.x > 0.5);
}

#[test]
fn test_sleep_transition() {
    let mut env = Environment::new();

    let mut body = unit_box_at(Vector3::zero());
    body.set_auto_sleep(true);
    body.set_linear_velocity(Vector3::new(0.01, 0.0, 0.0));
    let handle = env.register(body);

    // Crawling below the go-sleep thresholds for a full second, well
    // past the default 0.5 s duration
    env.update(1.0, 60);

    let body = env.get_body(handle).unwrap();
    assert!(body.is_sleeping());
    assert!(body.get_linear_velocity().is_zero());
    assert!(body.get_angular_velocity().is_zero());
    assert!(body.get_angular_momentum().is_zero());
}

#[test]
fn test_sleeping_body_wakes_on_fast_velocity() {
    let mut env = Environment::new();

    let mut body = unit_box_at(Vector3::zero());
    body.set_auto_sleep(true);
    let handle = env.register(body);

    env.update(1.0, 60);
    assert!(env.get_body(handle).unwrap().is_sleeping());

    // An injected velocity above the wake-up threshold rouses the body
    env.get_body_mut(handle)
        .unwrap()
        .set_linear_velocity(Vector3::new(2.0, 0.0, 0.0));
    env.update(1.0 / 60.0, 1);

    let body = env.get_body(handle).unwrap();
    assert!(!body.is_sleeping());
    assert!(body.get_position().x > 0.0);
}

#[test]
fn test_orientation_stays_orthonormal() {
    let mut body = RigidBody::new();
    body.update_inv_inertia_world();
    body.set_angular_velocity(Vector3::new(3.0, -4.0, 5.0));

    for _ in 0..500 {
        body.update_position(1.0 / 60.0);
    }

    let r = body.get_orientation();
    for i in 0..3 {
        assert!((r.column(i).length() - 1.0).abs() < 1.0e-3);
    }
    assert!(r.column(0).dot(&r.column(1)).abs() < 1.0e-3);
    assert!(r.column(1).dot(&r.column(2)).abs() < 1.0e-3);
    assert!(r.column(2).dot(&r.column(0)).abs() < 1.0e-3);
}

fn build_seeded_scene(seed: u64) -> (Environment, Vec<boxphys::BodyHandle>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut env = Environment::with_config(EnvironmentConfig::default());
    let mut handles = Vec::new();

    let mut floor = RigidBody::new();
    floor.set_shape_parameter(1000.0, 20.0, 1.0, 20.0, 0.3, 0.7).unwrap();
    floor.set_position(Vector3::new(0.0, -1.0, 0.0));
    floor.set_fixed(true);
    handles.push(env.register(floor));

    for _ in 0..5 {
        let mut body = RigidBody::new();
        body.set_shape_parameter(1.0, 0.5, 0.5, 0.5, 0.3, 0.7).unwrap();
        body.set_position(Vector3::new(
            rng.gen_range(-3.0..3.0),
            rng.gen_range(2.0..6.0),
            rng.gen_range(-3.0..3.0),
        ));
        body.set_orientation_from_euler(
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
        );
        handles.push(env.register(body));
    }

    (env, handles)
}

#[test]
fn test_determinism_across_identical_runs() {
    let (mut env_a, handles_a) = build_seeded_scene(7);
    let (mut env_b, handles_b) = build_seeded_scene(7);

    for _ in 0..90 {
        // The floor is fixed; gravity goes to the dynamic bodies only
        for handle in handles_a.iter().skip(1) {
            env_a
                .get_body_mut(*handle)
                .unwrap()
                .add_force(Vector3::new(0.0, -9.81, 0.0));
        }
        for handle in handles_b.iter().skip(1) {
            env_b
                .get_body_mut(*handle)
                .unwrap()
                .add_force(Vector3::new(0.0, -9.81, 0.0));
        }
        env_a.update(1.0 / 60.0, 2);
        env_b.update(1.0 / 60.0, 2);
    }

    for (ha, hb) in handles_a.iter().zip(handles_b.iter()) {
        let a = env_a.get_body(*ha).unwrap();
        let b = env_b.get_body(*hb).unwrap();
        assert_eq!(a.get_position(), b.get_position());
        assert_eq!(a.get_linear_velocity(), b.get_linear_velocity());
        assert_eq!(a.get_orientation(), b.get_orientation());
    }
}

#[test]
fn test_register_unregister_round_trip() {
    let mut env = Environment::new();
    let handle = env.register(unit_box_at(Vector3::new(1.0, 2.0, 3.0)));
    assert_eq!(env.body_count(), 1);

    let body = env.unregister(handle).unwrap();
    assert_eq!(body.get_position(), Vector3::new(1.0, 2.0, 3.0));
    assert_eq!(env.body_count(), 0);

    // The handle is dead now
    match env.get_body(handle) {
        Err(PhysicsError::BodyNotFound(_)) => {}
        other => panic!("expected BodyNotFound, got {:?}", other.map(|_| ())),
    }
    assert!(env.unregister(handle).is_err());
}

#[test]
fn test_contacts_are_exposed_per_substep() {
    let mut env = Environment::new();
    let h0 = env.register(unit_box_at(Vector3::zero()));
    let h1 = env.register(unit_box_at(Vector3::new(0.5, 0.0, 0.0)));

    env.update(1.0 / 60.0, 1);

    assert_eq!(env.contact_count(), 1);
    let contact = &env.contacts()[0];
    assert_eq!(contact.bodies, [h0, h1]);
    assert!(contact.penetration > 0.0);
}

#[test]
fn test_nearly_coincident_contacts_are_merged() {
    let mut env = Environment::new();

    // One box facing two almost identical boxes: all three pairs
    // collide at effectively the same spot
    env.register(unit_box_at(Vector3::zero()));
    env.register(unit_box_at(Vector3::new(1.9, 0.0, 0.0)));
    env.register(unit_box_at(Vector3::new(1.9001, 0.0, 0.0)));

    env.update(1.0 / 60.0, 1);

    assert_eq!(env.contact_count(), 1);
}

#[test]
fn test_fixed_fixed_pairs_are_skipped() {
    let mut env = Environment::new();

    let mut a = unit_box_at(Vector3::zero());
    a.set_fixed(true);
    let mut b = unit_box_at(Vector3::new(0.5, 0.0, 0.0));
    b.set_fixed(true);
    env.register(a);
    env.register(b);

    env.update(1.0 / 60.0, 1);
    assert_eq!(env.contact_count(), 0);
}

#[test]
fn test_forces_cleared_after_update() {
    let mut env = Environment::new();
    let handle = env.register(unit_box_at(Vector3::zero()));

    env.get_body_mut(handle)
        .unwrap()
        .add_force(Vector3::new(0.0, -10.0, 0.0));
    env.get_body_mut(handle)
        .unwrap()
        .add_torque(Vector3::new(1.0, 0.0, 0.0));
    env.update(1.0 / 60.0, 2);

    let body = env.get_body(handle).unwrap();
    assert!(body.get_force().is_zero());
    assert!(body.get_torque().is_zero());
}
