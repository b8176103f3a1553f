use std::path::PathBuf;

use super::*;
use crate::{compile::node::Position, timeline::window::TimeWindow};

#[test]
fn delay_node_window_form() {
    let node = DelayNode {
        input: 2,
        amount: DelayAmount::Window(TimeWindow::new(5.25, 8.75)),
        output: "a2".to_string(),
    };
    assert_eq!(node.to_string(), "[2:a]adelay=5.25|8.75[a2]");
}

#[test]
fn delay_node_millis_form() {
    let node = DelayNode {
        input: 0,
        amount: DelayAmount::Millis(250),
        output: "a0".to_string(),
    };
    assert_eq!(node.to_string(), "[0:a]adelay=250[a0]");
}

#[test]
fn mix_and_concat_nodes() {
    let labels = vec!["a1".to_string(), "a2".to_string()];
    let mix = MixNode {
        inputs: labels.clone(),
        output: "a".to_string(),
    };
    assert_eq!(mix.to_string(), "[a1][a2]amix=inputs=2[a]");

    let concat = ConcatNode {
        inputs: labels,
        video_streams: 0,
        audio_streams: 1,
        output: "outa".to_string(),
    };
    assert_eq!(concat.to_string(), "[a1][a2]concat=n=2:v=0:a=1[outa]");
}

#[test]
fn graph_joins_nodes_with_semicolons() {
    let graph = CompiledGraph {
        inputs: vec![PathBuf::from("x.aac")],
        first_input: 0,
        nodes: vec![
            FilterNode::Delay(DelayNode {
                input: 0,
                amount: DelayAmount::Millis(250),
                output: "a0".to_string(),
            }),
            FilterNode::Concat(ConcatNode {
                inputs: vec!["a0".to_string()],
                video_streams: 0,
                audio_streams: 1,
                output: "outa".to_string(),
            }),
        ],
        output: "outa".to_string(),
    };
    assert_eq!(
        graph.to_string(),
        "[0:a]adelay=250[a0];[a0]concat=n=1:v=0:a=1[outa]"
    );
}

#[test]
fn alpha_curve_expression() {
    let curve = AlphaCurve {
        window: TimeWindow::new(52.56, 61.47),
        fade_in: 1.3,
        fade_out: 2.0,
    };
    assert_eq!(
        curve.to_string(),
        "if(lt(t,52.56),0,if(lt(t,53.86),(t-52.56)/1.30,if(lt(t,59.47),1,if(lt(t,61.47),1-(t-59.47)/2.00,0))))"
    );
}

fn base_node() -> DrawTextNode {
    DrawTextNode {
        source: TextSource::File(PathBuf::from("text/abc-title.txt")),
        font_file: "fonts/Font.ttf".to_string(),
        font_size: 52,
        font_color: "black".to_string(),
        line_spacing: Some(2),
        position: Position::px(52, 64),
        enable: None,
        alpha: None,
    }
}

#[test]
fn drawtext_without_window_has_no_dangling_separator() {
    assert_eq!(
        base_node().to_string(),
        "drawtext=\"textfile=text/abc-title.txt:fontfile=fonts/Font.ttf:fontsize=52:fontcolor=black:line_spacing=2:x=52:y=64\""
    );
}

#[test]
fn drawtext_with_window_and_alpha() {
    let window = TimeWindow::new(5.0, 15.0);
    let node = DrawTextNode {
        enable: Some(window),
        alpha: Some(AlphaCurve {
            window,
            fade_in: 2.0,
            fade_out: 2.0,
        }),
        ..base_node()
    };
    let s = node.to_string();
    assert!(s.contains(":y=64:enable='between(t,5.00,15.00)':alpha='if(lt(t,5.00),0,"));
    assert!(s.ends_with("0))))'\""));
}

#[test]
fn inline_text_is_quoted_and_escaped() {
    let node = DrawTextNode {
        source: TextSource::Inline("Mit \"hjerte\" it's $5".to_string()),
        line_spacing: None,
        position: Position {
            x: Coord::expr("w-tw-15"),
            y: Coord::Px(15),
        },
        ..base_node()
    };
    assert_eq!(
        node.to_string(),
        "drawtext=\"text='Mit \\\"hjerte\\\" it'\\''s \\$5':fontfile=fonts/Font.ttf:fontsize=52:fontcolor=black:x=w-tw-15:y=15\""
    );
}

#[test]
fn shell_quote_leaves_plain_paths_alone() {
    assert_eq!(shell_quote("audio/intro.aac"), "audio/intro.aac");
    assert_eq!(shell_quote("videos/v_Long-1+2.mp4"), "videos/v_Long-1+2.mp4");
}

#[test]
fn shell_quote_wraps_metacharacters() {
    assert_eq!(shell_quote("audio/my clip.aac"), "'audio/my clip.aac'");
    assert_eq!(shell_quote("a;touch x;#"), "'a;touch x;#'");
    assert_eq!(shell_quote("$(id)`id`"), "'$(id)`id`'");
    assert_eq!(shell_quote("it's"), "'it'\\''s'");
    assert_eq!(shell_quote(""), "''");
}

#[test]
fn textfile_with_special_characters_is_quoted() {
    let src = TextSource::File(PathBuf::from("text/my clip:1.txt"));
    assert_eq!(src.to_string(), "textfile='text/my clip:1.txt'");

    let src = TextSource::File(PathBuf::from("text/$x.txt"));
    assert_eq!(src.to_string(), "textfile='text/\\$x.txt'");
}
