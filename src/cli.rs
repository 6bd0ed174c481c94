//! Shared command grammar and driver for the two binaries (`wadkit`,
//! `wadsh`). Each line is one command: a verb followed by space-separated
//! arguments — no variables, expressions, or control flow. This is the
//! thin CLI surface §6 calls for, not a scripting language.

use std::fs;

use wadkit::host::{
    self, set_linedef, set_sector, set_sidedef, set_thing, set_vertex, HostLinedef, HostSidedef,
    Session,
};
use wadkit::directory::Lump;
use wadkit::map::DoomMap;
use wadkit::wad::WadKind;
use wadkit::{Result, WadkitError};

/// Everything one script line can act on: the open archive plus whatever
/// map was last unpacked from it. Owned by the CLI binary, never global.
pub struct CliState {
    pub session: Session,
    pub current_map: Option<DoomMap>,
}

impl CliState {
    pub fn new() -> Self {
        CliState {
            session: Session::new(),
            current_map: None,
        }
    }
}

impl Default for CliState {
    fn default() -> Self {
        Self::new()
    }
}

/// Run one command line. Returns `Ok(Some(value))` when the command
/// produced a value worth echoing back (interactive shells print it
/// prefixed with `"<- "`), `Ok(None)` for commands that only act.
pub fn execute_line(state: &mut CliState, line: &str) -> Result<Option<String>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    let mut parts = line.split_whitespace();
    let verb = parts.next().unwrap_or("");
    let args: Vec<&str> = parts.collect();

    match verb {
        "open" => cmd_open(state, &args),
        "save" => cmd_save(state, &args),
        "list" => cmd_list(state),
        "find" => cmd_find(state, &args),
        "extract" => cmd_extract(state, &args),
        "insert" => cmd_insert(state, &args),
        "remove" => cmd_remove(state, &args),
        "unpack" => cmd_unpack(state, &args),
        "pack" => cmd_pack(state, &args),
        "move" => cmd_move(state, &args),
        "things" | "vertexes" | "sectors" | "sidedefs" | "linedefs" => {
            cmd_map_summary(state, verb)
        }
        "thing" => cmd_thing(state, &args),
        "set-thing" => cmd_set_thing(state, &args),
        "vertex" => cmd_vertex(state, &args),
        "set-vertex" => cmd_set_vertex(state, &args),
        "sector" => cmd_sector(state, &args),
        "set-sector" => cmd_set_sector(state, &args),
        "sidedef" => cmd_sidedef(state, &args),
        "set-sidedef" => cmd_set_sidedef(state, &args),
        "linedef" => cmd_linedef(state, &args),
        "set-linedef" => cmd_set_linedef(state, &args),
        other => Err(unknown_command(other)),
    }
}

fn unknown_command(verb: &str) -> WadkitError {
    WadkitError::InvalidMagic {
        found: verb.as_bytes().to_vec(),
        wanted: &[
            "open", "save", "list", "find", "extract", "insert", "remove", "unpack", "pack",
            "move", "thing", "set-thing", "vertex", "set-vertex", "sector", "set-sector",
            "sidedef", "set-sidedef", "linedef", "set-linedef",
        ],
    }
}

fn arg<'a>(args: &'a [&'a str], i: usize, name: &'static str) -> Result<&'a str> {
    args.get(i).copied().ok_or(WadkitError::OutOfRange {
        field: name,
        value: args.len() as i64,
        bound: (i + 1) as i64,
    })
}

fn parse_pos(s: &str) -> Result<usize> {
    s.parse::<usize>().map_err(|_| WadkitError::OutOfRange {
        field: "position",
        value: -1,
        bound: 0,
    })
}

fn parse_i16(s: &str, field: &'static str) -> Result<i16> {
    s.parse::<i16>().map_err(|_| WadkitError::OutOfRange {
        field,
        value: -1,
        bound: 0,
    })
}

fn parse_u16(s: &str, field: &'static str) -> Result<u16> {
    s.parse::<u16>().map_err(|_| WadkitError::OutOfRange {
        field,
        value: -1,
        bound: 0,
    })
}

/// `0` means "no reference" in the CLI's flat argument grammar, matching the
/// on-disk -1 sentinel's meaning at this 1-based, zero-for-absent surface.
fn parse_ref(s: &str, field: &'static str) -> Result<Option<usize>> {
    let n = parse_pos_signed(s, field)?;
    Ok(if n == 0 { None } else { Some(n as usize) })
}

fn parse_pos_signed(s: &str, field: &'static str) -> Result<i64> {
    s.parse::<i64>().map_err(|_| WadkitError::OutOfRange {
        field,
        value: -1,
        bound: 0,
    })
}

fn ref_to_arg(r: Option<usize>) -> String {
    r.map(|p| p.to_string()).unwrap_or_else(|| "0".to_string())
}

fn read_file(path: &str) -> Result<Vec<u8>> {
    fs::read(path).map_err(|e| WadkitError::io("read_file", 0, e))
}

fn write_file(path: &str, data: &[u8]) -> Result<()> {
    fs::write(path, data).map_err(|e| WadkitError::io("write_file", data.len(), e))
}

fn looks_like_zip(path: &str) -> bool {
    path.ends_with(".zip") || path.ends_with(".pk3")
}

fn cmd_open(state: &mut CliState, args: &[&str]) -> Result<Option<String>> {
    let path = arg(args, 0, "path")?;
    let bytes = read_file(path)?;
    state.session = if looks_like_zip(path) {
        Session::from_zip_bytes(&bytes)?
    } else {
        Session::from_wad_bytes(&bytes)?
    };
    state.current_map = None;
    Ok(Some(format!("opened {} ({} lumps)", path, state.session.len())))
}

fn cmd_save(state: &CliState, args: &[&str]) -> Result<Option<String>> {
    let path = arg(args, 0, "path")?;
    let bytes = if looks_like_zip(path) {
        state.session.emit_zip()?
    } else {
        let kind = match args.get(1).copied() {
            Some("iwad") => WadKind::Iwad,
            _ => state.session.kind.unwrap_or(WadKind::Pwad),
        };
        state.session.emit_wad(kind)?
    };
    write_file(path, &bytes)?;
    Ok(Some(format!("saved {} ({} bytes)", path, bytes.len())))
}

fn cmd_list(state: &CliState) -> Result<Option<String>> {
    let mut out = String::new();
    for (i, lump) in state.session.directory.iter().enumerate() {
        out.push_str(&format!(
            "{} {} ({} bytes)\n",
            i + 1,
            String::from_utf8_lossy(&lump.name),
            lump.data.len()
        ));
    }
    Ok(Some(out.trim_end().to_string()))
}

fn cmd_find(state: &CliState, args: &[&str]) -> Result<Option<String>> {
    let name = arg(args, 0, "name")?;
    let start: i64 = args.get(1).map(|s| s.parse().unwrap_or(0)).unwrap_or(0);
    match state.session.find(name.as_bytes(), start) {
        Some(pos) => Ok(Some(pos.to_string())),
        None => Ok(Some("absent".to_string())),
    }
}

fn cmd_extract(state: &CliState, args: &[&str]) -> Result<Option<String>> {
    let pos = parse_pos(arg(args, 0, "pos")?)?;
    let out_path = arg(args, 1, "out_path")?;
    let lump = state.session.get(pos)?;
    write_file(out_path, &lump.data)?;
    Ok(Some(format!("extracted {} bytes", lump.data.len())))
}

fn cmd_insert(state: &mut CliState, args: &[&str]) -> Result<Option<String>> {
    let pos = parse_pos(arg(args, 0, "pos")?)?;
    let name = arg(args, 1, "name")?;
    let data = match args.get(2) {
        Some(literal) => literal.as_bytes().to_vec(),
        None => Vec::new(),
    };
    state
        .session
        .insert(pos, Lump::new(name.as_bytes().to_vec(), data))?;
    Ok(None)
}

fn cmd_remove(state: &mut CliState, args: &[&str]) -> Result<Option<String>> {
    let pos = parse_pos(arg(args, 0, "pos")?)?;
    let removed = state.session.remove(pos)?;
    Ok(Some(String::from_utf8_lossy(&removed.name).to_string()))
}

fn cmd_unpack(state: &mut CliState, args: &[&str]) -> Result<Option<String>> {
    let pos = parse_pos(arg(args, 0, "pos")?)?;
    let map = state.session.unpack_map(pos)?;
    let summary = format!(
        "things={} linedefs={} sidedefs={} vertexes={} sectors={}",
        map.things.len(),
        map.linedefs.len(),
        map.sidedefs.len(),
        map.vertexes.len(),
        map.sectors.len()
    );
    state.current_map = Some(map);
    Ok(Some(summary))
}

fn cmd_pack(state: &mut CliState, args: &[&str]) -> Result<Option<String>> {
    let name = arg(args, 0, "name")?;
    let map = state
        .current_map
        .as_ref()
        .ok_or(WadkitError::OutOfRange {
            field: "current_map",
            value: 0,
            bound: 0,
        })?;
    let packed = Session::pack_map(map, name.as_bytes())?;
    let insert_at = state.session.len() + 1;
    Session::copy_range(&packed, 1, packed.len() + 1, &mut state.session.directory, insert_at)?;
    Ok(Some(format!("packed {} lumps", packed.len())))
}

fn cmd_move(state: &mut CliState, args: &[&str]) -> Result<Option<String>> {
    let src_start = parse_pos(arg(args, 0, "src_start")?)?;
    let src_end = parse_pos(arg(args, 1, "src_end")?)?;
    let dst_pos = parse_pos(arg(args, 2, "dst_pos")?)?;
    let src = state.session.directory.clone();
    Session::copy_range(&src, src_start, src_end, &mut state.session.directory, dst_pos)?;
    Ok(Some(format!("moved {} lumps", src_end.saturating_sub(src_start))))
}

fn cmd_map_summary(state: &CliState, which: &str) -> Result<Option<String>> {
    let map = state.current_map.as_ref().ok_or(WadkitError::OutOfRange {
        field: "current_map",
        value: 0,
        bound: 0,
    })?;
    let n = match which {
        "things" => map.things.len(),
        "vertexes" => map.vertexes.len(),
        "sectors" => map.sectors.len(),
        "sidedefs" => map.sidedefs.len(),
        "linedefs" => map.linedefs.len(),
        _ => 0,
    };
    Ok(Some(n.to_string()))
}

fn current_map(state: &CliState) -> Result<&DoomMap> {
    state.current_map.as_ref().ok_or(WadkitError::OutOfRange {
        field: "current_map",
        value: 0,
        bound: 0,
    })
}

fn cmd_thing(state: &CliState, args: &[&str]) -> Result<Option<String>> {
    let map = current_map(state)?;
    let pos = parse_pos(arg(args, 0, "pos")?)?;
    let t = host::thing_at(map, pos)?;
    Ok(Some(format!(
        "{} {} {} {} {}",
        t.x, t.y, t.angle, t.thing_type, t.flags
    )))
}

fn cmd_set_thing(state: &CliState, args: &[&str]) -> Result<Option<String>> {
    let map = current_map(state)?;
    let pos = parse_pos(arg(args, 0, "pos")?)?;
    let t = wadkit::map::Thing {
        x: parse_i16(arg(args, 1, "x")?, "x")?,
        y: parse_i16(arg(args, 2, "y")?, "y")?,
        angle: parse_u16(arg(args, 3, "angle")?, "angle")?,
        thing_type: parse_u16(arg(args, 4, "type")?, "type")?,
        flags: parse_u16(arg(args, 5, "flags")?, "flags")?,
    };
    set_thing(map, pos, t)?;
    Ok(None)
}

fn cmd_vertex(state: &CliState, args: &[&str]) -> Result<Option<String>> {
    let map = current_map(state)?;
    let pos = parse_pos(arg(args, 0, "pos")?)?;
    let v = host::vertex_at(map, pos)?;
    Ok(Some(format!("{} {}", v.x, v.y)))
}

fn cmd_set_vertex(state: &CliState, args: &[&str]) -> Result<Option<String>> {
    let map = current_map(state)?;
    let pos = parse_pos(arg(args, 0, "pos")?)?;
    let v = wadkit::map::Vertex {
        x: parse_i16(arg(args, 1, "x")?, "x")?,
        y: parse_i16(arg(args, 2, "y")?, "y")?,
    };
    set_vertex(map, pos, v)?;
    Ok(None)
}

fn cmd_sector(state: &CliState, args: &[&str]) -> Result<Option<String>> {
    let map = current_map(state)?;
    let pos = parse_pos(arg(args, 0, "pos")?)?;
    let s = host::sector_at(map, pos)?;
    Ok(Some(format!(
        "{} {} {} {} {} {} {}",
        s.floor_h,
        s.ceil_h,
        String::from_utf8_lossy(&s.floor_tex),
        String::from_utf8_lossy(&s.ceil_tex),
        s.light,
        s.special,
        s.tag
    )))
}

fn cmd_set_sector(state: &CliState, args: &[&str]) -> Result<Option<String>> {
    let map = current_map(state)?;
    let pos = parse_pos(arg(args, 0, "pos")?)?;
    let s = wadkit::map::Sector {
        floor_h: parse_i16(arg(args, 1, "floor_h")?, "floor_h")?,
        ceil_h: parse_i16(arg(args, 2, "ceil_h")?, "ceil_h")?,
        floor_tex: arg(args, 3, "floor_tex")?.as_bytes().to_vec(),
        ceil_tex: arg(args, 4, "ceil_tex")?.as_bytes().to_vec(),
        light: parse_i16(arg(args, 5, "light")?, "light")?,
        special: parse_i16(arg(args, 6, "special")?, "special")?,
        tag: parse_i16(arg(args, 7, "tag")?, "tag")?,
    };
    set_sector(map, pos, s)?;
    Ok(None)
}

fn cmd_sidedef(state: &CliState, args: &[&str]) -> Result<Option<String>> {
    let map = current_map(state)?;
    let pos = parse_pos(arg(args, 0, "pos")?)?;
    let s = host::sidedef_at(map, pos)?;
    Ok(Some(format!(
        "{} {} {} {} {} {}",
        s.x_off,
        s.y_off,
        String::from_utf8_lossy(&s.upper_tex),
        String::from_utf8_lossy(&s.middle_tex),
        String::from_utf8_lossy(&s.lower_tex),
        ref_to_arg(s.sector_ref)
    )))
}

fn cmd_set_sidedef(state: &CliState, args: &[&str]) -> Result<Option<String>> {
    let map = current_map(state)?;
    let pos = parse_pos(arg(args, 0, "pos")?)?;
    let s = HostSidedef {
        x_off: parse_i16(arg(args, 1, "x_off")?, "x_off")?,
        y_off: parse_i16(arg(args, 2, "y_off")?, "y_off")?,
        upper_tex: arg(args, 3, "upper_tex")?.as_bytes().to_vec(),
        middle_tex: arg(args, 4, "middle_tex")?.as_bytes().to_vec(),
        lower_tex: arg(args, 5, "lower_tex")?.as_bytes().to_vec(),
        sector_ref: parse_ref(arg(args, 6, "sector_ref")?, "sector_ref")?,
    };
    set_sidedef(map, pos, s)?;
    Ok(None)
}

fn cmd_linedef(state: &CliState, args: &[&str]) -> Result<Option<String>> {
    let map = current_map(state)?;
    let pos = parse_pos(arg(args, 0, "pos")?)?;
    let l = host::linedef_at(map, pos)?;
    Ok(Some(format!(
        "{} {} {} {} {} {} {}",
        l.v_start,
        l.v_end,
        l.flags,
        l.special,
        l.tag,
        ref_to_arg(l.front_side),
        ref_to_arg(l.back_side)
    )))
}

fn cmd_set_linedef(state: &CliState, args: &[&str]) -> Result<Option<String>> {
    let map = current_map(state)?;
    let pos = parse_pos(arg(args, 0, "pos")?)?;
    let l = HostLinedef {
        v_start: parse_pos(arg(args, 1, "v_start")?)?,
        v_end: parse_pos(arg(args, 2, "v_end")?)?,
        flags: parse_u16(arg(args, 3, "flags")?, "flags")?,
        special: parse_i16(arg(args, 4, "special")?, "special")?,
        tag: parse_i16(arg(args, 5, "tag")?, "tag")?,
        front_side: parse_ref(arg(args, 6, "front_side")?, "front_side")?,
        back_side: parse_ref(arg(args, 7, "back_side")?, "back_side")?,
    };
    set_linedef(map, pos, l)?;
    Ok(None)
}
