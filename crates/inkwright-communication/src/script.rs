//! Motion script construction.
//!
//! The controller speaks a plaintext scripting protocol: single
//! point-to-point moves (`movel`) and compound programs that declare named
//! waypoints and traverse them with blended moves (`movep`) at scheduled
//! speeds. A program is built here as a structured step list and rendered
//! to wire text in one place, so the numeric formatting rules (three
//! decimal places for speeds and blends, full precision for coordinates)
//! stay centralized and testable.
//!
//! Speed phases: a sub-stroke that must decelerate into a curvature
//! reversal (`slow_down`) cruises until the final 35 steps, ramps linearly
//! down to 10% of cruise speed, and ends with one unblended terminal move
//! at 10%. A full-speed sub-stroke gets a synthetic midway waypoint just
//! before its true end (so the blend curve cannot lift prematurely), ramps
//! over the final 12 steps, and ends with a small-blend move plus an
//! unblended terminal move, both at 20% of cruise speed.

use inkwright_core::config::MotionSettings;
use inkwright_core::Pose;
use inkwright_trajectory::SubStroke;

/// Name of the compound program on the controller
const PROGRAM_NAME: &str = "tes";

/// Tool activation primitive sent before every compound program
pub const ACTIVATE_TOOL: &str = "rq_activate_and_wait()\n";

/// Ramp length of the decelerating (slow_down) profile, in steps
const SLOW_RAMP_STEPS: usize = 35;
/// Ramp length of the full-speed profile, in steps
const NORMAL_RAMP_STEPS: usize = 12;
/// Terminal speed of the slow profile, as a fraction of cruise speed
const SLOW_FINAL_RATE: f64 = 0.1;
/// Ramp target of the normal profile, as a fraction of cruise speed
const NORMAL_FINAL_RATE: f64 = 0.1;
/// Z drop of the synthetic midway waypoint (m)
const MIDWAY_DROP: f64 = 0.0125;
/// Blend radius of the blended terminal move in the normal profile (m)
const TERMINAL_BLEND: f64 = 0.001;

/// Render the six pose components in wire order, full precision
fn format_pose(pose: &Pose) -> String {
    let v = pose.to_array();
    format!("{}, {}, {}, {}, {}, {}", v[0], v[1], v[2], v[3], v[4], v[5])
}

/// A single point-to-point move command
pub fn movel_command(pose: &Pose, acceleration: f64, speed: f64, blend: f64) -> String {
    format!(
        "movel(p[{}], a={}, v={}, r={})\n",
        format_pose(pose),
        acceleration,
        speed,
        blend
    )
}

/// One blended move inside a compound program
#[derive(Debug, Clone, PartialEq)]
struct MoveStep {
    /// Program tree slot of the step annotation
    slot: usize,
    /// Waypoint number shown in the annotation
    label: usize,
    /// Waypoint number actually moved to (1-based)
    waypoint: usize,
    /// Commanded speed (m/s)
    speed: f64,
    /// Blend radius, or `None` for an unblended stop
    blend: Option<f64>,
}

/// A compound motion program for one sub-stroke
///
/// Holds the point-to-point preamble (first sub-stroke of a stroke only),
/// the named waypoint declarations, and the speed-scheduled move steps.
/// The terminal waypoint doubles as the convergence target.
#[derive(Debug, Clone)]
pub struct MotionProgram {
    preamble: Vec<Pose>,
    declarations: Vec<(usize, Pose)>,
    steps: Vec<MoveStep>,
    acceleration: f64,
    terminal: Pose,
}

impl MotionProgram {
    /// Build the program for one sub-stroke.
    ///
    /// The sub-stroke must hold at least two waypoints; this is an
    /// invariant of the segmenter and is debug-asserted here.
    pub fn build(sub: &SubStroke, motion: &MotionSettings) -> Self {
        debug_assert!(sub.waypoints.len() >= 2, "sub-stroke needs >= 2 waypoints");

        let mut waypoints = sub.waypoints.clone();
        if !sub.slow_down && waypoints.len() > 1 {
            waypoints.insert(waypoints.len() - 1, midway_waypoint(&waypoints));
        }
        let argc = waypoints.len();

        // The first two waypoints of a stroke's first sub-stroke are driven
        // point-to-point for precise initial contact. A compound block with
        // a single declared waypoint is valid, so no minimum is held back.
        let preamble_len = if sub.is_first { 2 } else { 0 };
        let preamble = waypoints[..preamble_len].to_vec();

        let declarations = waypoints
            .iter()
            .enumerate()
            .skip(preamble_len)
            .map(|(i, pose)| (i + 1, *pose))
            .collect();

        let cruise = motion.cruise_speed;
        let mut steps = Vec::with_capacity(argc);
        for i in preamble_len..argc - 1 {
            if !sub.slow_down && i == argc - 2 {
                // The midway waypoint is issued in the terminal phase below.
                continue;
            }
            steps.push(MoveStep {
                slot: i + 3,
                label: i + 1,
                waypoint: i + 1,
                speed: ramp_speed(sub.slow_down, i, argc, cruise),
                blend: Some(motion.blend_radius),
            });
        }

        if sub.slow_down {
            steps.push(MoveStep {
                slot: argc + 2,
                label: argc,
                waypoint: argc,
                speed: SLOW_FINAL_RATE * cruise,
                blend: None,
            });
        } else {
            let terminal_speed = NORMAL_FINAL_RATE * cruise * 2.0;
            steps.push(MoveStep {
                slot: argc + 1,
                label: argc,
                waypoint: argc - 1,
                speed: terminal_speed,
                blend: Some(TERMINAL_BLEND),
            });
            steps.push(MoveStep {
                slot: argc + 2,
                label: argc,
                waypoint: argc,
                speed: terminal_speed,
                blend: None,
            });
        }

        Self {
            preamble,
            declarations,
            steps,
            acceleration: motion.acceleration,
            terminal: waypoints[argc - 1],
        }
    }

    /// Waypoints to drive point-to-point before sending the program
    pub fn preamble(&self) -> &[Pose] {
        &self.preamble
    }

    /// The expected pose once the program has finished
    pub fn terminal(&self) -> &Pose {
        &self.terminal
    }

    /// Render the program to wire text
    pub fn render(&self) -> String {
        let mut out = format!("def {}():\n", PROGRAM_NAME);
        for (number, pose) in &self.declarations {
            out.push_str(&format!(
                "  global Waypoint_{}_p=p[{}]\n",
                number,
                format_pose(pose)
            ));
        }
        out.push_str("  $ 1 \"Robot Program\"\n  $ 2 \"MoveP\"\n");
        for step in &self.steps {
            out.push_str(&format!("  $ {} \"Waypoint_{}\"\n", step.slot, step.label));
            match step.blend {
                Some(blend) => out.push_str(&format!(
                    "  movep(Waypoint_{}_p, a={}, v={:.3}, r={:.3})\n",
                    step.waypoint, self.acceleration, step.speed, blend
                )),
                None => out.push_str(&format!(
                    "  movep(Waypoint_{}_p, a={}, v={:.3})\n",
                    step.waypoint, self.acceleration, step.speed
                )),
            }
        }
        out.push_str("end\n");
        out
    }

    /// The command that starts execution of a transmitted program
    pub fn invocation(&self) -> String {
        format!("{}()\n", PROGRAM_NAME)
    }
}

/// Speed of step `i` of `argc` waypoints under the given profile: cruise
/// until the ramp starts, then a linear decrease per step.
fn ramp_speed(slow_down: bool, i: usize, argc: usize, cruise: f64) -> f64 {
    let (ramp_steps, final_rate) = if slow_down {
        (SLOW_RAMP_STEPS, SLOW_FINAL_RATE)
    } else {
        (NORMAL_RAMP_STEPS, NORMAL_FINAL_RATE)
    };
    let unit = (1.0 - final_rate) * cruise / ramp_steps as f64;

    // The ramp start may be negative for short blocks; the offset then
    // grows beyond the nominal ramp position but stays below the step
    // count, so the speed never reaches zero.
    let ramp_start = argc as isize - 1 - ramp_steps as isize;
    let i = i as isize;
    if i >= ramp_start {
        cruise - unit * (i - ramp_start) as f64
    } else {
        cruise
    }
}

/// The synthetic waypoint inserted before a full-speed sub-stroke's true
/// end: the average of the last two positions, lowered slightly so the
/// blend curve keeps the tool down until the real terminal point.
fn midway_waypoint(waypoints: &[Pose]) -> Pose {
    let a = &waypoints[waypoints.len() - 2];
    let b = &waypoints[waypoints.len() - 1];
    Pose {
        x: (a.x + b.x) * 0.5,
        y: (a.y + b.y) * 0.5,
        z: (a.z + b.z) * 0.5 - MIDWAY_DROP,
        rx: (a.rx + b.rx) * 0.5,
        ry: (a.ry + b.ry) * 0.5,
        rz: (a.rz + b.rz) * 0.5,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> MotionSettings {
        MotionSettings::default()
    }

    fn waypoint(i: usize) -> Pose {
        Pose::new(0.1 + i as f64 * 0.001, -0.45, 0.26, 0.0, 3.14, 0.0)
    }

    fn sub(len: usize, slow_down: bool, is_first: bool) -> SubStroke {
        SubStroke {
            waypoints: (0..len).map(waypoint).collect(),
            slow_down,
            is_first,
        }
    }

    #[test]
    fn movel_renders_pose_and_parameters() {
        let cmd = movel_command(&Pose::new(0.1, -0.45, 0.26, 0.0, 3.14, 0.0), 0.2, 0.28, 0.0);
        assert_eq!(cmd, "movel(p[0.1, -0.45, 0.26, 0, 3.14, 0], a=0.2, v=0.28, r=0)\n");
    }

    #[test]
    fn full_speed_program_gets_midway_and_two_terminal_moves() {
        let program = MotionProgram::build(&sub(6, false, false), &settings());
        let text = program.render();

        // 6 waypoints + midway declared.
        assert_eq!(text.matches("global Waypoint_").count(), 7);
        // Blended terminal move at 20% cruise with the small blend radius,
        // then an unblended final move at the same speed.
        assert!(text.contains("movep(Waypoint_6_p, a=0.2, v=0.056, r=0.001)\n"));
        assert!(text.ends_with("movep(Waypoint_7_p, a=0.2, v=0.056)\nend\n"));
    }

    #[test]
    fn slow_program_ends_with_single_unblended_move_at_ten_percent() {
        let program = MotionProgram::build(&sub(6, true, false), &settings());
        let text = program.render();

        assert_eq!(text.matches("global Waypoint_").count(), 6);
        assert!(text.ends_with("movep(Waypoint_6_p, a=0.2, v=0.028)\nend\n"));
        assert!(!text.contains("r=0.001"));
    }

    #[test]
    fn first_sub_stroke_moves_first_two_waypoints_point_to_point() {
        let program = MotionProgram::build(&sub(6, false, true), &settings());
        assert_eq!(program.preamble().len(), 2);
        assert_eq!(program.preamble()[0], waypoint(0));

        let text = program.render();
        assert!(!text.contains("Waypoint_1_p"));
        assert!(!text.contains("Waypoint_2_p"));
        assert!(text.contains("Waypoint_3_p"));
    }

    #[test]
    fn short_first_sub_stroke_still_yields_two_point_to_point_moves() {
        // Three waypoints, two consumed by the preamble: the compound block
        // declares a single waypoint and jumps straight to the terminal move.
        let program = MotionProgram::build(&sub(3, true, true), &settings());
        assert_eq!(program.preamble().len(), 2);

        let text = program.render();
        assert_eq!(text.matches("global Waypoint_").count(), 1);
        assert!(text.contains("global Waypoint_3_p"));
        assert!(text.ends_with("movep(Waypoint_3_p, a=0.2, v=0.028)\nend\n"));
    }

    #[test]
    fn slow_ramp_descends_linearly_to_final_rate() {
        let cruise = settings().cruise_speed;
        let argc = 40;
        // Cruise before the ramp.
        assert_eq!(ramp_speed(true, 0, argc, cruise), cruise);
        // First ramp step is still at cruise speed.
        assert_eq!(ramp_speed(true, argc - 1 - SLOW_RAMP_STEPS, argc, cruise), cruise);
        // Last scheduled step sits one unit above the terminal rate.
        let unit = (1.0 - SLOW_FINAL_RATE) * cruise / SLOW_RAMP_STEPS as f64;
        let last = ramp_speed(true, argc - 2, argc, cruise);
        assert!((last - (cruise - unit * (SLOW_RAMP_STEPS - 1) as f64)).abs() < 1e-12);
        assert!(last > SLOW_FINAL_RATE * cruise);
    }

    #[test]
    fn short_slow_block_keeps_positive_speeds() {
        let cruise = settings().cruise_speed;
        for i in 0..19 {
            let speed = ramp_speed(true, i, 20, cruise);
            assert!(speed > SLOW_FINAL_RATE * cruise - 1e-12);
        }
    }

    #[test]
    fn speeds_are_rendered_to_three_decimals() {
        let program = MotionProgram::build(&sub(20, true, false), &settings());
        let text = program.render();
        for line in text.lines().filter(|l| l.contains("movep")) {
            let v = line.split("v=").nth(1).unwrap();
            let digits = v.split(|c| c == ',' || c == ')').next().unwrap();
            let frac = digits.split('.').nth(1).unwrap_or("");
            assert_eq!(frac.len(), 3, "bad speed field in {}", line);
        }
    }

    #[test]
    fn invocation_calls_the_program_by_name() {
        let program = MotionProgram::build(&sub(4, false, false), &settings());
        assert_eq!(program.invocation(), "tes()\n");
    }

    #[test]
    fn terminal_is_the_true_last_waypoint() {
        let program = MotionProgram::build(&sub(6, false, false), &settings());
        assert_eq!(program.terminal(), &waypoint(5));
    }

    #[test]
    fn midway_sits_between_and_below_the_last_two() {
        let s = sub(4, false, false);
        let mid = midway_waypoint(&s.waypoints);
        let (a, b) = (&s.waypoints[2], &s.waypoints[3]);
        assert!((mid.x - (a.x + b.x) * 0.5).abs() < 1e-12);
        assert!((mid.z - ((a.z + b.z) * 0.5 - 0.0125)).abs() < 1e-12);
    }
}
