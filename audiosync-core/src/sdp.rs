//! Opus tuning applied to outgoing session descriptions.
//!
//! Browsers advertise opus with conservative defaults. Before a description is
//! sent, the format-parameters line for the opus payload type is extended with
//! low-latency, high-bitrate stereo settings.

/// Parameters appended to (or inserted as) the opus `a=fmtp` line.
pub const OPUS_PARAMS: &str =
    "minptime=10;ptime=10;useinbandfec=1;stereo=1;sprop-stereo=1;maxaveragebitrate=510000;dtx=0";

const RTPMAP_PREFIX: &str = "a=rtpmap:";
const OPUS_ENCODING: &str = "opus/48000/2";

/// Returns `sdp` with [`OPUS_PARAMS`] applied to the stereo opus payload type.
///
/// Descriptions without a stereo opus `a=rtpmap` line come back unchanged. Every
/// other line keeps its bytes and position. Applying this twice duplicates the
/// parameters, so call it exactly once per description.
pub fn tune_opus(sdp: &str) -> String {
    let lines: Vec<&str> = sdp.split_inclusive('\n').collect();

    let Some((rtpmap_idx, payload_type)) = lines
        .iter()
        .enumerate()
        .find_map(|(i, line)| opus_payload_type(trim_eol(line)).map(|pt| (i, pt)))
    else {
        return sdp.to_owned();
    };

    let fmtp_prefix = format!("a=fmtp:{payload_type}");
    let fmtp_idx = lines.iter().position(|line| {
        trim_eol(line)
            .strip_prefix(&fmtp_prefix)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with(' '))
    });

    let mut out = String::with_capacity(sdp.len() + OPUS_PARAMS.len() + fmtp_prefix.len() + 4);
    for (i, line) in lines.iter().enumerate() {
        if Some(i) == fmtp_idx {
            let body = trim_eol(line);
            out.push_str(body);
            out.push(';');
            out.push_str(OPUS_PARAMS);
            out.push_str(&line[body.len()..]);
            continue;
        }

        out.push_str(line);

        if fmtp_idx.is_none() && i == rtpmap_idx {
            let eol = match &line[trim_eol(line).len()..] {
                "" => "\r\n",
                eol => eol,
            };
            // The rtpmap line may be the unterminated last line.
            if !line.ends_with('\n') {
                out.push_str(eol);
            }
            out.push_str(&fmtp_prefix);
            out.push(' ');
            out.push_str(OPUS_PARAMS);
            if line.ends_with('\n') {
                out.push_str(eol);
            }
        }
    }
    out
}

fn trim_eol(line: &str) -> &str {
    line.trim_end_matches(['\r', '\n'])
}

/// Payload type of an `a=rtpmap:<pt> opus/48000/2` line.
fn opus_payload_type(line: &str) -> Option<&str> {
    let rest = &line[line.find(RTPMAP_PREFIX)? + RTPMAP_PREFIX.len()..];
    let (pt, encoding) = rest.split_once(' ')?;
    if pt.is_empty() || !pt.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    (encoding.split_whitespace().next() == Some(OPUS_ENCODING)).then_some(pt)
}
