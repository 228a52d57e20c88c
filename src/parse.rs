use crate::types::{Demand, RegionSpec, ShapeCatalog, ShapeMask};

/// Parses the textual puzzle format into a catalog and region list.
///
/// Two kinds of record, in any order:
/// - a shape definition: a header line like `0:` followed by `#`/`.` rows,
///   terminated by a blank or unrelated line;
/// - a region definition: `WxH: c0 c1 c2 ...`, where the position of each
///   count is the shape id it refers to.
///
/// Lines matching neither form are skipped, as are region lines whose size
/// fails to parse. Negative counts mean "not required", like zero;
/// non-numeric count tokens are an error.
pub fn parse_input(text: &str) -> Result<(ShapeCatalog, Vec<RegionSpec>), String> {
    let lines: Vec<&str> = text.lines().map(str::trim).collect();
    let mut catalog = ShapeCatalog::new();
    let mut regions = Vec::new();

    let mut i = 0;
    while i < lines.len() {
        let line = lines[i];

        if line.ends_with(':') && !line.contains('x') {
            // Shape header; a non-numeric id is not ours to parse.
            let Ok(id) = line[..line.len() - 1].parse::<usize>() else {
                i += 1;
                continue;
            };
            i += 1;
            let mut rows = Vec::new();
            while i < lines.len() {
                let row = lines[i];
                if row.is_empty() || !row.chars().all(|c| c == '#' || c == '.') {
                    break;
                }
                rows.push(row);
                i += 1;
            }
            if !rows.is_empty() {
                let mask = ShapeMask::from_rows(&rows)
                    .map_err(|e| format!("shape {}: {}", id, e))?;
                catalog.insert(id, mask);
            }
        } else if line.contains('x') && line.contains(':') {
            if let Some(region) = parse_region(line)? {
                regions.push(region);
            }
            i += 1;
        } else {
            i += 1;
        }
    }

    Ok((catalog, regions))
}

/// `Ok(None)` means the size did not parse and the line is not a region
/// definition at all; a count that is not a number is a real error.
fn parse_region(line: &str) -> Result<Option<RegionSpec>, String> {
    let Some((size, counts)) = line.split_once(':') else {
        return Ok(None);
    };
    let Some((width, height)) = size.split_once('x') else {
        return Ok(None);
    };
    let (Ok(width), Ok(height)) = (width.trim().parse::<i64>(), height.trim().parse::<i64>())
    else {
        return Ok(None);
    };

    let demands = counts
        .split_whitespace()
        .enumerate()
        .map(|(shape, token)| {
            let qty = token
                .parse::<i64>()
                .map_err(|_| format!("invalid count '{}' in '{}'", token, line))?;
            Ok(Demand {
                shape,
                qty: qty.max(0) as u64,
            })
        })
        .collect::<Result<Vec<_>, String>>()?;

    Ok(Some(RegionSpec {
        width,
        height,
        demands,
    }))
}
