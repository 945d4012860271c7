use crate::controls::{Capability, ControlError, SceneControls};
use std::str::FromStr;

/// A mutation request from the host, independent of how it was produced
/// (UI button, script line, native call).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    MoveUp,
    ChangeBallSize(f32),
    ChangeBallColor { r: f32, g: f32, b: f32, a: f32 },
    SetBallVisible(bool),
    SetFloorVisible(bool),
    /// Rebuild the scene from its initial configuration.
    Reset,
    /// The output surface changed size.
    ResizeViewport { width: u32, height: u32 },
}

impl Action {
    /// Capability a controller needs to perform this action, if any.
    pub fn required_capability(&self) -> Option<Capability> {
        match self {
            Self::MoveUp => Some(Capability::MoveUp),
            Self::ChangeBallSize(_) => Some(Capability::ResizeBall),
            Self::ChangeBallColor { .. } => Some(Capability::RecolorBall),
            Self::SetBallVisible(_) | Self::SetFloorVisible(_) => {
                Some(Capability::ToggleVisibility)
            }
            Self::Reset | Self::ResizeViewport { .. } => None,
        }
    }

    /// Perform the action through `controls`. Fails with `Unsupported` when
    /// the controller lacks the required capability.
    pub fn apply(&self, controls: &dyn SceneControls) -> Result<(), ControlError> {
        match *self {
            Self::MoveUp => require(Capability::MoveUp, controls.as_move_up())?.move_up(),
            Self::ChangeBallSize(size) => {
                require(Capability::ResizeBall, controls.as_resize_ball())?.change_ball_size(size)
            }
            Self::ChangeBallColor { r, g, b, a } => {
                require(Capability::RecolorBall, controls.as_recolor_ball())?
                    .change_ball_color(r, g, b, a)
            }
            Self::SetBallVisible(visible) => {
                require(Capability::ToggleVisibility, controls.as_toggle_visibility())?
                    .set_ball_visible(visible)
            }
            Self::SetFloorVisible(visible) => {
                require(Capability::ToggleVisibility, controls.as_toggle_visibility())?
                    .set_floor_visible(visible)
            }
            Self::Reset => controls.scene().with_mut(|s| s.reset()),
            Self::ResizeViewport { width, height } => controls
                .scene()
                .with_mut(|s| s.resize_viewport(width, height)),
        }
        Ok(())
    }
}

fn require<T: ?Sized>(capability: Capability, found: Option<&T>) -> Result<&T, ControlError> {
    found.ok_or(ControlError::Unsupported(capability))
}

fn parse_err(input: &str, reason: impl Into<String>) -> ControlError {
    ControlError::Parse {
        input: input.to_string(),
        reason: reason.into(),
    }
}

fn parse_num<T: FromStr>(input: &str, token: Option<&str>, what: &str) -> Result<T, ControlError> {
    let token = token.ok_or_else(|| parse_err(input, format!("missing {what}")))?;
    token
        .parse()
        .map_err(|_| parse_err(input, format!("invalid {what} {token:?}")))
}

fn parse_switch(input: &str, token: Option<&str>) -> Result<bool, ControlError> {
    match token {
        Some("on" | "true" | "show" | "1") => Ok(true),
        Some("off" | "false" | "hide" | "0") => Ok(false),
        Some(other) => Err(parse_err(input, format!("expected on/off, got {other:?}"))),
        None => Err(parse_err(input, "missing on/off")),
    }
}

/// Text form, one action per line:
///
/// ```text
/// up
/// size 3
/// color 1 0 0 [1]
/// ball on|off
/// floor on|off
/// reset
/// viewport 800 600
/// ```
impl FromStr for Action {
    type Err = ControlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim();
        let mut tokens = input.split_whitespace();
        let verb = tokens
            .next()
            .ok_or_else(|| parse_err(input, "empty action"))?
            .to_ascii_lowercase();

        let action = match verb.as_str() {
            "up" | "move_up" => Self::MoveUp,
            "size" => Self::ChangeBallSize(parse_num(input, tokens.next(), "size")?),
            "color" => {
                let r = parse_num(input, tokens.next(), "red")?;
                let g = parse_num(input, tokens.next(), "green")?;
                let b = parse_num(input, tokens.next(), "blue")?;
                let a = match tokens.next() {
                    Some(t) => parse_num(input, Some(t), "alpha")?,
                    None => 1.0,
                };
                Self::ChangeBallColor { r, g, b, a }
            }
            "ball" => Self::SetBallVisible(parse_switch(input, tokens.next())?),
            "floor" => Self::SetFloorVisible(parse_switch(input, tokens.next())?),
            "reset" => Self::Reset,
            "viewport" => Self::ResizeViewport {
                width: parse_num(input, tokens.next(), "width")?,
                height: parse_num(input, tokens.next(), "height")?,
            },
            other => return Err(parse_err(input, format!("unknown action {other:?}"))),
        };

        if let Some(extra) = tokens.next() {
            return Err(parse_err(input, format!("unexpected {extra:?}")));
        }
        Ok(action)
    }
}

/// Largest `xN` repeat accepted by [`parse_script`].
pub const MAX_REPEAT: usize = 10_000;

/// Parse a script of actions separated by `;` or newlines. Blank entries and
/// `#` comments are skipped. A trailing `xN` repeats an entry, e.g. `up x4`,
/// up to [`MAX_REPEAT`] times.
pub fn parse_script(script: &str) -> Result<Vec<Action>, ControlError> {
    let mut actions = Vec::new();
    for entry in script.split([';', '\n']) {
        let entry = entry.split('#').next().unwrap_or_default().trim();
        if entry.is_empty() {
            continue;
        }
        let (body, repeat) = match entry.rsplit_once(char::is_whitespace) {
            Some((body, count)) if count.starts_with('x') && count.len() > 1 => {
                let n: usize = count[1..]
                    .parse()
                    .map_err(|_| parse_err(entry, format!("invalid repeat {count:?}")))?;
                if n > MAX_REPEAT {
                    return Err(parse_err(
                        entry,
                        format!("repeat {n} exceeds the limit of {MAX_REPEAT}"),
                    ));
                }
                (body, n)
            }
            _ => (entry, 1),
        };
        let action: Action = body.parse()?;
        actions.extend(std::iter::repeat_n(action, repeat));
    }
    Ok(actions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controls::{BallController, RiseOnlyController};
    use glam::Vec3;
    use spherescene_kernel::{GROUND, SPHERE, Scene, SceneConfig, SceneHandle};
    use spherescene_render::{FrameSnapshot, RenderLoop, Renderer};
    use std::thread;

    #[test]
    fn parse_single_actions() {
        assert_eq!("up".parse::<Action>().unwrap(), Action::MoveUp);
        assert_eq!(
            " size 3 ".parse::<Action>().unwrap(),
            Action::ChangeBallSize(3.0)
        );
        assert_eq!(
            "color 1 0 0.5".parse::<Action>().unwrap(),
            Action::ChangeBallColor {
                r: 1.0,
                g: 0.0,
                b: 0.5,
                a: 1.0
            }
        );
        assert_eq!(
            "ball off".parse::<Action>().unwrap(),
            Action::SetBallVisible(false)
        );
        assert_eq!(
            "FLOOR on".parse::<Action>().unwrap(),
            Action::SetFloorVisible(true)
        );
        assert_eq!(
            "viewport 800 600".parse::<Action>().unwrap(),
            Action::ResizeViewport {
                width: 800,
                height: 600
            }
        );
    }

    #[test]
    fn parse_rejects_bad_input() {
        for bad in ["", "jump", "size", "size big", "ball maybe", "up now", "viewport 1"] {
            let err = bad.parse::<Action>().unwrap_err();
            assert!(matches!(err, ControlError::Parse { .. }), "{bad:?}");
        }
    }

    #[test]
    fn parse_script_expands_repeats() {
        let actions = parse_script("size 3; up x4\nfloor off # hide it\n\n").unwrap();
        assert_eq!(actions.len(), 6);
        assert_eq!(actions[0], Action::ChangeBallSize(3.0));
        assert!(actions[1..5].iter().all(|a| *a == Action::MoveUp));
        assert_eq!(actions[5], Action::SetFloorVisible(false));
        assert!(parse_script("up xx").is_err());
    }

    #[test]
    fn parse_script_rejects_oversized_repeat() {
        for script in ["up x18446744073709551615", "up x10001", "size 2 x99999999"] {
            let err = parse_script(script).unwrap_err();
            assert!(matches!(err, ControlError::Parse { .. }), "{script:?}");
        }
        assert_eq!(parse_script("up x10000").unwrap().len(), MAX_REPEAT);
    }

    #[test]
    fn scenario_through_actions() {
        let handle = SceneHandle::default();
        let ctl = BallController::attach(handle.clone()).unwrap();
        for action in parse_script("size 3; up x4; floor off").unwrap() {
            action.apply(&ctl).unwrap();
        }

        let scene = handle.read();
        let sphere = scene.get_entity(SPHERE).unwrap();
        assert_eq!(sphere.transform.scale, Vec3::splat(3.0));
        assert!((sphere.transform.position.y - 1.2).abs() < 1e-5);
        assert!(sphere.visible);
        assert!(!scene.get_entity(GROUND).unwrap().visible);
    }

    #[test]
    fn rise_only_rejects_other_actions() {
        let handle = SceneHandle::new(Scene::new(SceneConfig::rise_only()));
        let ctl = RiseOnlyController::attach(handle.clone()).unwrap();

        Action::MoveUp.apply(&ctl).unwrap();
        let err = Action::ChangeBallColor {
            r: 1.0,
            g: 0.0,
            b: 0.0,
            a: 1.0,
        }
        .apply(&ctl)
        .unwrap_err();
        assert!(matches!(
            err,
            ControlError::Unsupported(Capability::RecolorBall)
        ));
        assert!(matches!(
            Action::SetFloorVisible(false).apply(&ctl),
            Err(ControlError::Unsupported(Capability::ToggleVisibility))
        ));
        assert_eq!(handle.read().revision(), 1);
    }

    #[test]
    fn required_capability_matches_dispatch() {
        let handle = SceneHandle::new(Scene::new(SceneConfig::rise_only()));
        let ctl = RiseOnlyController::attach(handle).unwrap();
        let script = "up; size 2; color 1 0 0; ball off; floor on; reset; viewport 4 3";
        for action in parse_script(script).unwrap() {
            let result = action.apply(&ctl);
            match action.required_capability() {
                Some(cap) if !ctl.supports(cap) => assert!(
                    matches!(result, Err(ControlError::Unsupported(c)) if c == cap),
                    "{action:?}"
                ),
                _ => assert!(result.is_ok(), "{action:?}"),
            }
        }
    }

    #[test]
    fn reset_and_viewport_need_no_capability() {
        let handle = SceneHandle::new(Scene::new(SceneConfig::rise_only()));
        let ctl = RiseOnlyController::attach(handle.clone()).unwrap();
        Action::MoveUp.apply(&ctl).unwrap();
        Action::ResizeViewport {
            width: 400,
            height: 200,
        }
        .apply(&ctl)
        .unwrap();
        assert_eq!(handle.read().camera().aspect, 2.0);

        Action::Reset.apply(&ctl).unwrap();
        let scene = handle.read();
        assert_eq!(scene.get_entity(SPHERE).unwrap().transform.position.y, 1.0);
    }

    struct Capture;

    impl Renderer for Capture {
        type Output = FrameSnapshot;

        fn render(&self, frame: &FrameSnapshot) -> FrameSnapshot {
            frame.clone()
        }
    }

    #[test]
    fn host_thread_mutations_reach_the_loop() {
        let handle = SceneHandle::default();
        let mut lp = RenderLoop::new(handle.clone(), Capture);
        let ctl = BallController::attach(handle).unwrap();

        let first = lp.render_frame();
        assert!(first.draw(GROUND).is_some());

        let host = thread::spawn(move || {
            for action in parse_script("size 3; up x4; floor off").unwrap() {
                action.apply(&ctl).unwrap();
            }
        });
        host.join().unwrap();

        let frame = lp.render_frame();
        assert!(frame.draw(GROUND).is_none());
        let sphere = frame.draw(SPHERE).unwrap();
        assert_eq!(sphere.transform.scale, Vec3::splat(3.0));
        assert!((sphere.transform.position.y - 1.2).abs() < 1e-5);
        assert_eq!(frame.revision, 6);
    }
}
