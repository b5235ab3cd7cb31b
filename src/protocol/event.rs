//! Inbound notification messages.
//!
//! Notifications are the frontend-to-driver half of the protocol: state
//! announcements the session dispatches into its window and prompt
//! mirrors. The first token of a line selects a family; a line whose
//! family is unrecognized parses to [`Notification::Unknown`] and is
//! dropped without comment, which is how the protocol stays forward
//! compatible.
//!
//! # Notification Families
//!
//! | Family | Sub-actions |
//! |--------|-------------|
//! | `GENERIC` | `STARTED`, `CLOSING_DOWN`, `FINISHED`, `LAUNCH`, `EXIT`, `POLL`, `PRESENT_COOKIES` |
//! | `WINDOW` | `NEW`, `DESTROY`, `REDRAW`, `SIZE`, `TITLE`, `SET_URL`, `SET_STATUS`, `SET_POINTER`, `SET_SCALE`, `SET_SCROLL`, `GET_SCROLL`, `SCROLL_START`, `UPDATE_EXTENT`, `GET_DIMENSIONS`, `UPDATE_BOX`, `NEW_CONTENT`, `NEW_ICON`, `START_THROBBER`, `STOP_THROBBER`, `CONSOLE_LOG` |
//! | `LOGIN` | `OPEN`, `USER`, `PASS`, `REALM`, `DESTROY` |
//! | `SSLCERT` | `VERIFY`, `DESTROY` |
//! | `PLOT` | opaque plot tokens |

// ============================================================================
// Imports
// ============================================================================

use crate::identifiers::{CertId, LoginId, WindowId};
use crate::protocol::args::TokenCursor;

// ============================================================================
// Notification
// ============================================================================

/// One parsed inbound line.
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    /// Process-level announcement.
    Generic(GenericEvent),

    /// Window-scoped announcement.
    Window {
        /// Target window.
        window: WindowId,
        /// What happened to it.
        action: WindowAction,
    },

    /// Credential-prompt announcement.
    Login {
        /// Target prompt.
        login: LoginId,
        /// What happened to it.
        action: LoginAction,
    },

    /// Certificate-prompt announcement.
    SslCert {
        /// Target prompt.
        cert: CertId,
        /// What happened to it.
        action: CertAction,
    },

    /// Drawing output for the window in draw-capture mode.
    ///
    /// The tokens are opaque to the driver; they are captured in order
    /// and handed back to the test unmodified.
    Plot {
        /// Raw plot tokens, `PLOT` prefix stripped.
        tokens: Vec<String>,
    },

    /// Line whose first token is not a known family.
    ///
    /// Dropped silently.
    Unknown {
        /// The full line.
        line: String,
    },

    /// Line in a known family whose argument shape did not parse.
    ///
    /// Dropped with a diagnostic; likely a protocol skew between driver
    /// and frontend.
    Malformed {
        /// The full line.
        line: String,
    },
}

// ============================================================================
// GenericEvent
// ============================================================================

/// `GENERIC` family sub-actions.
#[derive(Debug, Clone, PartialEq)]
pub enum GenericEvent {
    /// Frontend finished initializing and is ready for commands.
    Started,

    /// Frontend has begun tearing down.
    ClosingDown,

    /// Teardown is complete; exit follows.
    Finished,

    /// Frontend echoed the URL it was launched with.
    Launch {
        /// The launch URL.
        url: String,
    },

    /// Frontend announced its exit code on the wire.
    ///
    /// Distinct from the channel actually closing, which the transport
    /// reports separately; both feed the same exit policy.
    Exit {
        /// The announced exit code.
        code: i32,
    },

    /// Scheduler chatter from the frontend's own main loop. Ignored.
    Poll,

    /// Cookie dump announcement. Ignored.
    PresentCookies,

    /// Recognized family, unrecognized sub-action.
    Unknown {
        /// The sub-action token.
        action: String,
    },
}

// ============================================================================
// WindowAction
// ============================================================================

/// `WINDOW` family sub-actions.
#[derive(Debug, Clone, PartialEq)]
pub enum WindowAction {
    /// A window came into existence.
    New(NewWindowParams),

    /// The window is gone; its mirror becomes inert.
    Destroy,

    /// A draw-capture cycle began.
    RedrawStart,

    /// The active draw-capture cycle ended.
    RedrawStop,

    /// An attribute mutation to apply to the window mirror.
    Update(WindowUpdate),

    /// Recognized family, unrecognized sub-action.
    Unknown {
        /// The sub-action token.
        action: String,
    },
}

/// Fields announced with a new window.
#[derive(Debug, Clone, PartialEq)]
pub struct NewWindowParams {
    /// Identifier of the owning core-side entity, kept opaque.
    pub core_id: String,
    /// Window this one was cloned from or opened by, when any.
    pub existing: Option<WindowId>,
    /// Whether the window opened as a tab.
    pub new_tab: bool,
    /// Whether the window is a clone of `existing`.
    pub clone: bool,
}

/// Attribute mutations a window mirror applies.
#[derive(Debug, Clone, PartialEq)]
pub enum WindowUpdate {
    /// Viewport dimensions changed.
    Size {
        /// Width in pixels.
        width: u32,
        /// Height in pixels.
        height: u32,
    },

    /// Title text changed.
    Title {
        /// New title.
        title: String,
    },

    /// Displayed URL changed.
    Url {
        /// New URL.
        url: String,
    },

    /// Status-bar text changed.
    Status {
        /// New status text.
        status: String,
    },

    /// Pointer shape changed.
    Pointer {
        /// New pointer shape name.
        pointer: String,
    },

    /// Rendering scale changed.
    Scale {
        /// New scale factor.
        scale: f64,
    },

    /// Scroll offset changed.
    Scroll {
        /// Horizontal offset.
        x: i32,
        /// Vertical offset.
        y: i32,
    },

    /// Scroll offset reset to the origin.
    ScrollStart,

    /// Content extent changed.
    Extent {
        /// Content width.
        width: u32,
        /// Content height.
        height: u32,
    },

    /// Page load began; the throbber is spinning.
    ThrobberStart,

    /// Page load ended; the throbber stopped.
    ThrobberStop,

    /// A console message was emitted in the window.
    ConsoleLog {
        /// Message source, e.g. a script URL.
        source: String,
        /// Whether the frontend considers the entry foldable.
        foldable: bool,
        /// Severity level token.
        level: String,
        /// Message text.
        message: String,
    },

    /// A box in the layout was updated. Parsed, no state change.
    BoxUpdated,

    /// The window received new content. No state change.
    ContentChanged,

    /// The window's favicon changed. No state change.
    IconChanged,
}

// ============================================================================
// LoginAction
// ============================================================================

/// `LOGIN` family sub-actions.
#[derive(Debug, Clone, PartialEq)]
pub enum LoginAction {
    /// A credential prompt opened.
    Open {
        /// URL the credentials are requested for.
        url: String,
    },

    /// The frontend supplied a username value.
    Username {
        /// The value.
        value: String,
    },

    /// The frontend supplied a password value.
    Password {
        /// The value.
        value: String,
    },

    /// The frontend supplied an authentication realm.
    Realm {
        /// The value.
        value: String,
    },

    /// The prompt is gone.
    Destroy,

    /// Recognized family, unrecognized sub-action.
    Unknown {
        /// The sub-action token.
        action: String,
    },
}

// ============================================================================
// CertAction
// ============================================================================

/// `SSLCERT` family sub-actions.
#[derive(Debug, Clone, PartialEq)]
pub enum CertAction {
    /// A certificate prompt opened.
    Verify {
        /// URL whose certificate needs a decision.
        url: String,
    },

    /// The prompt is gone.
    Destroy,

    /// Recognized family, unrecognized sub-action.
    Unknown {
        /// The sub-action token.
        action: String,
    },
}

// ============================================================================
// Parsing
// ============================================================================

impl Notification {
    /// Parses one decoded line.
    ///
    /// Never fails: lines that do not fit the protocol come back as
    /// [`Notification::Unknown`] or [`Notification::Malformed`] for the
    /// dispatcher's drop policy to handle.
    #[must_use]
    pub fn parse(line: &str) -> Self {
        let mut cur = TokenCursor::new(line);
        let parsed = match cur.next() {
            Some("GENERIC") => parse_generic(&mut cur),
            Some("WINDOW") => parse_window(&mut cur),
            Some("LOGIN") => parse_login(&mut cur),
            Some("SSLCERT") => parse_sslcert(&mut cur),
            Some("PLOT") => Some(Self::Plot {
                tokens: cur.rest_tokens(),
            }),
            _ => {
                return Self::Unknown {
                    line: line.to_owned(),
                };
            }
        };
        parsed.unwrap_or_else(|| Self::Malformed {
            line: line.to_owned(),
        })
    }
}

fn parse_generic(cur: &mut TokenCursor<'_>) -> Option<Notification> {
    let event = match cur.next()? {
        "STARTED" => GenericEvent::Started,
        "CLOSING_DOWN" => GenericEvent::ClosingDown,
        "FINISHED" => GenericEvent::Finished,
        "LAUNCH" => GenericEvent::Launch {
            url: cur.tagged("URL")?.to_owned(),
        },
        "EXIT" => GenericEvent::Exit {
            code: cur.parse_next()?,
        },
        "POLL" => GenericEvent::Poll,
        "PRESENT_COOKIES" => GenericEvent::PresentCookies,
        other => GenericEvent::Unknown {
            action: other.to_owned(),
        },
    };
    Some(Notification::Generic(event))
}

fn parse_window(cur: &mut TokenCursor<'_>) -> Option<Notification> {
    let action = cur.next()?;
    // Placeholder token (`WIN`, or `NULL` from older frontends).
    cur.next()?;
    let window = WindowId::from_token(cur.next()?)?;

    let action = match action {
        "NEW" => WindowAction::New(NewWindowParams {
            core_id: cur.tagged("FOR")?.to_owned(),
            existing: cur.tagged("EXISTING").and_then(WindowId::from_token),
            new_tab: cur.tagged("NEWTAB")? == "TRUE",
            clone: cur.tagged("CLONE")? == "TRUE",
        }),
        "DESTROY" => WindowAction::Destroy,
        // Anything other than START ends the capture; partial-damage
        // redraws report a bare region token there.
        "REDRAW" => match cur.next()? {
            "START" => WindowAction::RedrawStart,
            _ => WindowAction::RedrawStop,
        },
        "SIZE" => WindowAction::Update(WindowUpdate::Size {
            width: cur.tagged_parse("WIDTH")?,
            height: cur.tagged_parse("HEIGHT")?,
        }),
        "TITLE" => WindowAction::Update(WindowUpdate::Title {
            title: cur.tagged_rest("STR"),
        }),
        "SET_URL" => WindowAction::Update(WindowUpdate::Url {
            url: cur.tagged("URL")?.to_owned(),
        }),
        "SET_STATUS" => WindowAction::Update(WindowUpdate::Status {
            status: cur.tagged_rest("STR"),
        }),
        "SET_POINTER" => WindowAction::Update(WindowUpdate::Pointer {
            pointer: cur.tagged("POINTER")?.to_owned(),
        }),
        "SET_SCALE" => WindowAction::Update(WindowUpdate::Scale {
            scale: cur.tagged_parse("SCALE")?,
        }),
        "SET_SCROLL" | "GET_SCROLL" => WindowAction::Update(WindowUpdate::Scroll {
            x: cur.tagged_parse("X")?,
            y: cur.tagged_parse("Y")?,
        }),
        "SCROLL_START" => WindowAction::Update(WindowUpdate::ScrollStart),
        "UPDATE_EXTENT" => WindowAction::Update(WindowUpdate::Extent {
            width: cur.tagged_parse("WIDTH")?,
            height: cur.tagged_parse("HEIGHT")?,
        }),
        "GET_DIMENSIONS" => WindowAction::Update(WindowUpdate::Size {
            width: cur.tagged_parse("WIDTH")?,
            height: cur.tagged_parse("HEIGHT")?,
        }),
        "START_THROBBER" => WindowAction::Update(WindowUpdate::ThrobberStart),
        "STOP_THROBBER" => WindowAction::Update(WindowUpdate::ThrobberStop),
        "CONSOLE_LOG" => {
            let source = cur.tagged("SOURCE")?.to_owned();
            // Any folding token other than FOLDABLE means not foldable;
            // the entry is still kept.
            let foldable = cur.next()? == "FOLDABLE";
            let level = cur.next()?.to_owned();
            WindowAction::Update(WindowUpdate::ConsoleLog {
                source,
                foldable,
                level,
                message: cur.rest_joined(),
            })
        }
        "UPDATE_BOX" => WindowAction::Update(WindowUpdate::BoxUpdated),
        "NEW_CONTENT" => WindowAction::Update(WindowUpdate::ContentChanged),
        "NEW_ICON" => WindowAction::Update(WindowUpdate::IconChanged),
        other => WindowAction::Unknown {
            action: other.to_owned(),
        },
    };
    Some(Notification::Window { window, action })
}

fn parse_login(cur: &mut TokenCursor<'_>) -> Option<Notification> {
    let action = cur.next()?;
    cur.next()?; // placeholder (`LWIN`)
    let login = LoginId::from_token(cur.next()?)?;

    let action = match action {
        "OPEN" => LoginAction::Open {
            url: cur.tagged_rest("URL"),
        },
        "USER" => LoginAction::Username {
            value: cur.tagged_rest("STR"),
        },
        "PASS" => LoginAction::Password {
            value: cur.tagged_rest("STR"),
        },
        "REALM" => LoginAction::Realm {
            value: cur.tagged_rest("STR"),
        },
        "DESTROY" => LoginAction::Destroy,
        other => LoginAction::Unknown {
            action: other.to_owned(),
        },
    };
    Some(Notification::Login { login, action })
}

fn parse_sslcert(cur: &mut TokenCursor<'_>) -> Option<Notification> {
    let action = cur.next()?;
    cur.next()?; // placeholder (`CWIN`)
    let cert = CertId::from_token(cur.next()?)?;

    let action = match action {
        "VERIFY" => CertAction::Verify {
            url: cur.tagged_rest("URL"),
        },
        "DESTROY" => CertAction::Destroy,
        other => CertAction::Unknown {
            action: other.to_owned(),
        },
    };
    Some(Notification::SslCert { cert, action })
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generic_lifecycle() {
        assert_eq!(
            Notification::parse("GENERIC STARTED"),
            Notification::Generic(GenericEvent::Started)
        );
        assert_eq!(
            Notification::parse("GENERIC CLOSING_DOWN"),
            Notification::Generic(GenericEvent::ClosingDown)
        );
        assert_eq!(
            Notification::parse("GENERIC FINISHED"),
            Notification::Generic(GenericEvent::Finished)
        );
        assert_eq!(
            Notification::parse("GENERIC EXIT 0"),
            Notification::Generic(GenericEvent::Exit { code: 0 })
        );
    }

    #[test]
    fn test_generic_launch_records_url() {
        assert_eq!(
            Notification::parse("GENERIC LAUNCH URL about:blank"),
            Notification::Generic(GenericEvent::Launch {
                url: "about:blank".into()
            })
        );
    }

    #[test]
    fn test_generic_chatter_is_tolerated() {
        assert_eq!(
            Notification::parse("GENERIC POLL BLOCKING"),
            Notification::Generic(GenericEvent::Poll)
        );
        assert_eq!(
            Notification::parse("GENERIC POLL TIMED 25"),
            Notification::Generic(GenericEvent::Poll)
        );
        assert_eq!(
            Notification::parse("GENERIC PRESENT_COOKIES PATH cookies"),
            Notification::Generic(GenericEvent::PresentCookies)
        );
    }

    #[test]
    fn test_window_new_fully_tagged() {
        let n = Notification::parse("WINDOW NEW WIN 1 FOR 7 EXISTING NONE NEWTAB TRUE CLONE FALSE");
        assert_eq!(
            n,
            Notification::Window {
                window: WindowId::new(1),
                action: WindowAction::New(NewWindowParams {
                    core_id: "7".into(),
                    existing: None,
                    new_tab: true,
                    clone: false,
                }),
            }
        );
    }

    #[test]
    fn test_window_new_short_form() {
        // Older frontends omit the NEWTAB/CLONE labels and use a NULL
        // placeholder; the flags still parse positionally.
        let n = Notification::parse("WINDOW NEW NULL 1 FOR 7 EXISTING NONE TRUE FALSE");
        assert_eq!(
            n,
            Notification::Window {
                window: WindowId::new(1),
                action: WindowAction::New(NewWindowParams {
                    core_id: "7".into(),
                    existing: None,
                    new_tab: true,
                    clone: false,
                }),
            }
        );
    }

    #[test]
    fn test_window_new_with_existing_reference() {
        let n = Notification::parse("WINDOW NEW WIN 3 FOR 9 EXISTING 1 NEWTAB FALSE CLONE TRUE");
        let Notification::Window {
            action: WindowAction::New(params),
            ..
        } = n
        else {
            panic!("expected WINDOW NEW");
        };
        assert_eq!(params.existing, Some(WindowId::new(1)));
        assert!(!params.new_tab);
        assert!(params.clone);
    }

    #[test]
    fn test_window_attribute_updates() {
        assert_eq!(
            Notification::parse("WINDOW SIZE WIN 2 WIDTH 800 HEIGHT 600"),
            Notification::Window {
                window: WindowId::new(2),
                action: WindowAction::Update(WindowUpdate::Size {
                    width: 800,
                    height: 600
                }),
            }
        );
        assert_eq!(
            Notification::parse("WINDOW TITLE WIN 2 STR NetSurf test page"),
            Notification::Window {
                window: WindowId::new(2),
                action: WindowAction::Update(WindowUpdate::Title {
                    title: "NetSurf test page".into()
                }),
            }
        );
        assert_eq!(
            Notification::parse("WINDOW SET_SCROLL WIN 2 X 0 Y -40"),
            Notification::Window {
                window: WindowId::new(2),
                action: WindowAction::Update(WindowUpdate::Scroll { x: 0, y: -40 }),
            }
        );
        assert_eq!(
            Notification::parse("WINDOW SET_SCALE WIN 2 SCALE 1.5"),
            Notification::Window {
                window: WindowId::new(2),
                action: WindowAction::Update(WindowUpdate::Scale { scale: 1.5 }),
            }
        );
    }

    #[test]
    fn test_window_throbber_and_redraw() {
        assert_eq!(
            Notification::parse("WINDOW START_THROBBER WIN 1"),
            Notification::Window {
                window: WindowId::new(1),
                action: WindowAction::Update(WindowUpdate::ThrobberStart),
            }
        );
        assert_eq!(
            Notification::parse("WINDOW REDRAW WIN 1 START"),
            Notification::Window {
                window: WindowId::new(1),
                action: WindowAction::RedrawStart,
            }
        );
        assert_eq!(
            Notification::parse("WINDOW REDRAW WIN 1 STOP"),
            Notification::Window {
                window: WindowId::new(1),
                action: WindowAction::RedrawStop,
            }
        );
        // A region token in place of START/STOP still closes the cycle.
        assert_eq!(
            Notification::parse("WINDOW REDRAW WIN 1 0,0,100,100"),
            Notification::Window {
                window: WindowId::new(1),
                action: WindowAction::RedrawStop,
            }
        );
    }

    #[test]
    fn test_window_console_log() {
        let n = Notification::parse(
            "WINDOW CONSOLE_LOG WIN 4 SOURCE console NOT-FOLDABLE WARNING mixed content",
        );
        assert_eq!(
            n,
            Notification::Window {
                window: WindowId::new(4),
                action: WindowAction::Update(WindowUpdate::ConsoleLog {
                    source: "console".into(),
                    foldable: false,
                    level: "WARNING".into(),
                    message: "mixed content".into(),
                }),
            }
        );
    }

    #[test]
    fn test_console_log_unknown_folding_token_is_kept() {
        let n = Notification::parse("WINDOW CONSOLE_LOG WIN 4 SOURCE js UNFOLDED ERROR boom");
        assert_eq!(
            n,
            Notification::Window {
                window: WindowId::new(4),
                action: WindowAction::Update(WindowUpdate::ConsoleLog {
                    source: "js".into(),
                    foldable: false,
                    level: "ERROR".into(),
                    message: "boom".into(),
                }),
            }
        );
    }

    #[test]
    fn test_free_text_preserves_space_runs() {
        assert_eq!(
            Notification::parse("WINDOW TITLE WIN 1 STR two  spaces"),
            Notification::Window {
                window: WindowId::new(1),
                action: WindowAction::Update(WindowUpdate::Title {
                    title: "two  spaces".into()
                }),
            }
        );
        assert_eq!(
            Notification::parse("WINDOW CONSOLE_LOG WIN 1 SOURCE console NOT-FOLDABLE LOG a  b"),
            Notification::Window {
                window: WindowId::new(1),
                action: WindowAction::Update(WindowUpdate::ConsoleLog {
                    source: "console".into(),
                    foldable: false,
                    level: "LOG".into(),
                    message: "a  b".into(),
                }),
            }
        );
        assert_eq!(
            Notification::parse("LOGIN PASS LWIN 1 STR pass  word"),
            Notification::Login {
                login: LoginId::new(1),
                action: LoginAction::Password {
                    value: "pass  word".into()
                },
            }
        );
    }

    #[test]
    fn test_login_announcements() {
        assert_eq!(
            Notification::parse("LOGIN OPEN LWIN 1 URL http://h/p"),
            Notification::Login {
                login: LoginId::new(1),
                action: LoginAction::Open {
                    url: "http://h/p".into()
                },
            }
        );
        // The URL is the whole tail, spaces and all.
        assert_eq!(
            Notification::parse("LOGIN OPEN LWIN 2 URL http://h/a b"),
            Notification::Login {
                login: LoginId::new(2),
                action: LoginAction::Open {
                    url: "http://h/a b".into()
                },
            }
        );
        assert_eq!(
            Notification::parse("LOGIN REALM LWIN 1 STR secret garden"),
            Notification::Login {
                login: LoginId::new(1),
                action: LoginAction::Realm {
                    value: "secret garden".into()
                },
            }
        );
        assert_eq!(
            Notification::parse("LOGIN DESTROY LWIN 1"),
            Notification::Login {
                login: LoginId::new(1),
                action: LoginAction::Destroy,
            }
        );
    }

    #[test]
    fn test_sslcert_announcements() {
        assert_eq!(
            Notification::parse("SSLCERT VERIFY CWIN 2 URL https://h/"),
            Notification::SslCert {
                cert: CertId::new(2),
                action: CertAction::Verify {
                    url: "https://h/".into()
                },
            }
        );
        assert_eq!(
            Notification::parse("SSLCERT DESTROY CWIN 2"),
            Notification::SslCert {
                cert: CertId::new(2),
                action: CertAction::Destroy,
            }
        );
    }

    #[test]
    fn test_plot_tokens_stay_unjoined() {
        assert_eq!(
            Notification::parse("PLOT TEXT X 10 Y 20 STR hello world"),
            Notification::Plot {
                tokens: vec![
                    "TEXT".into(),
                    "X".into(),
                    "10".into(),
                    "Y".into(),
                    "20".into(),
                    "STR".into(),
                    "hello".into(),
                    "world".into(),
                ],
            }
        );
    }

    #[test]
    fn test_unknown_family_is_unknown() {
        assert_eq!(
            Notification::parse("FROBNICATE WIN 1"),
            Notification::Unknown {
                line: "FROBNICATE WIN 1".into()
            }
        );
        assert_eq!(
            Notification::parse(""),
            Notification::Unknown { line: String::new() }
        );
    }

    #[test]
    fn test_unknown_subactions_fall_through() {
        assert_eq!(
            Notification::parse("WINDOW SPARKLE WIN 1"),
            Notification::Window {
                window: WindowId::new(1),
                action: WindowAction::Unknown {
                    action: "SPARKLE".into()
                },
            }
        );
        assert_eq!(
            Notification::parse("GENERIC WIBBLE"),
            Notification::Generic(GenericEvent::Unknown {
                action: "WIBBLE".into()
            })
        );
    }

    #[test]
    fn test_malformed_known_family() {
        assert!(matches!(
            Notification::parse("WINDOW SIZE WIN 1 WIDTH x HEIGHT 2"),
            Notification::Malformed { .. }
        ));
        assert!(matches!(
            Notification::parse("WINDOW NEW WIN notanumber FOR 1 EXISTING NONE TRUE FALSE"),
            Notification::Malformed { .. }
        ));
        assert!(matches!(
            Notification::parse("GENERIC EXIT nope"),
            Notification::Malformed { .. }
        ));
        assert!(matches!(
            Notification::parse("LOGIN"),
            Notification::Malformed { .. }
        ));
    }
}
