#![allow(clippy::unwrap_used)]

use approx::assert_relative_eq;
use porenet::math::{Point3, Vector3};
use porenet::operations::diagnostics::SliceSelector;
use porenet::operations::facet::FacetStatus;
use porenet::topology::{Network, PoreData, PoreId, ThroatData, ThroatId, VertexData, VertexId};
use porenet::{GeometryConfig, VoronoiGeometry};

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing_subscriber::filter::LevelFilter::WARN.into());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_test_writer()
        .try_init();
}

/// A 2 x 2 x 1 block of 8-unit cells. Each cell is an internal pore, the
/// four inner facets are throats, and every outer facet of a cell leads to
/// its own boundary pore.
struct Block {
    network: Network,
    cells: Vec<PoreId>,
    inner: Vec<ThroatId>,
}

fn block() -> Block {
    const SIDE: f64 = 8.0;
    let mut network = Network::new();
    let mut corner = [[[VertexId::default(); 2]; 3]; 3];
    for (i, row) in corner.iter_mut().enumerate() {
        for (j, col) in row.iter_mut().enumerate() {
            for (k, id) in col.iter_mut().enumerate() {
                let p = Point3::new(i as f64 * SIDE, j as f64 * SIDE, k as f64 * SIDE);
                *id = network.add_vertex(VertexData::new(p));
            }
        }
    }

    // facet normal to `axis` at layer `layer`, spanning cell (u, v) of the
    // two other axes
    let facet = |axis: usize, layer: usize, u: usize, v: usize| -> Vec<VertexId> {
        [(0, 0), (1, 0), (1, 1), (0, 1)]
            .iter()
            .map(|&(du, dv)| {
                let mut ijk = [0usize; 3];
                let (a, b) = match axis {
                    0 => (1, 2),
                    1 => (0, 2),
                    _ => (0, 1),
                };
                ijk[axis] = layer;
                ijk[a] = u + du;
                ijk[b] = v + dv;
                corner[ijk[0]][ijk[1]][ijk[2]]
            })
            .collect()
    };

    let mut cells = Vec::new();
    for i in 0..2 {
        for j in 0..2 {
            let mut hull = Vec::new();
            for di in 0..2 {
                for dj in 0..2 {
                    for dk in 0..2 {
                        hull.push(corner[i + di][j + dj][dk]);
                    }
                }
            }
            let centre = Point3::new(
                (i as f64 + 0.5) * SIDE,
                (j as f64 + 0.5) * SIDE,
                0.5 * SIDE,
            );
            cells.push(network.add_pore(PoreData::new(centre, hull)));
        }
    }
    let cell = |i: usize, j: usize| cells[i * 2 + j];

    let mut inner = Vec::new();
    for j in 0..2 {
        let t = ThroatData::new([cell(0, j), cell(1, j)], facet(0, 1, j, 0));
        inner.push(network.add_throat(t).unwrap());
    }
    for i in 0..2 {
        let t = ThroatData::new([cell(i, 0), cell(i, 1)], facet(1, 1, i, 0));
        inner.push(network.add_throat(t).unwrap());
    }

    for i in 0..2 {
        for j in 0..2 {
            let outer = [
                (0, if i == 0 { 0 } else { 2 }, j, 0),
                (1, if j == 0 { 0 } else { 2 }, i, 0),
                (2, 0, i, j),
                (2, 1, i, j),
            ];
            for (axis, layer, u, v) in outer {
                let ids = facet(axis, layer, u, v);
                let centre = ids
                    .iter()
                    .map(|&id| network.vertex(id).unwrap().point.coords)
                    .sum::<Vector3>()
                    / 4.0;
                let boundary = network.add_pore(PoreData::boundary(Point3::from(centre), ids.clone()));
                network
                    .add_throat(ThroatData::new([cell(i, j), boundary], ids))
                    .unwrap();
            }
        }
    }

    Block {
        network,
        cells,
        inner,
    }
}

fn config() -> GeometryConfig {
    GeometryConfig::default()
        .with_voxel_length(0.5)
        .with_fibre_radius(0.75)
}

#[test]
fn block_geometry_end_to_end() {
    init_tracing();
    let mut b = block();
    let throats_before = b.network.num_throats();
    let geometry = VoronoiGeometry::build(&mut b.network, &config()).unwrap();

    assert!(geometry.trimmed().is_empty());
    assert_eq!(b.network.num_throats(), throats_before);

    let cell_volume = 8.0f64.powi(3);
    let mut total = 0.0;
    for &id in &b.cells {
        let pore = geometry.store().pore(id).unwrap();
        assert!(pore.volume > 0.6 * cell_volume && pore.volume <= cell_volume);
        // fibres run along the cell edges only, so the sphere may reach past
        // the faces but not the edges
        assert!(pore.indiameter > 0.0 && pore.indiameter < 12.0);
        total += pore.volume;
    }
    let image = geometry.fibre_image();
    let porosity = image.porosity();
    assert!(porosity > 0.0 && porosity < 1.0);
    assert!(total <= 4.0 * cell_volume);

    for &id in &b.inner {
        let throat = geometry.store().throat(id).unwrap();
        assert_eq!(throat.status, FacetStatus::Open);
        assert!(throat.area > 0.0 && throat.area < 64.0);
        assert_relative_eq!(throat.c2c, 8.0, epsilon = 1e-6);
        assert_relative_eq!(throat.length, 1.5);
    }
}

#[test]
fn thick_fibres_close_every_throat() {
    init_tracing();
    let mut b = block();
    let cfg = config().with_fibre_radius(4.5);
    let geometry = VoronoiGeometry::build(&mut b.network, &cfg).unwrap();
    assert_eq!(b.network.num_throats(), 0);
    assert_eq!(geometry.trimmed().len(), 4 + 16);
    assert_eq!(geometry.store().throats().count(), 0);
}

#[test]
fn diagnostics_follow_the_fibre_image() {
    init_tracing();
    let mut b = block();
    let geometry = VoronoiGeometry::build(&mut b.network, &config()).unwrap();
    let shape = geometry.fibre_image().shape();

    let slice = geometry
        .fibre_slice(SliceSelector::Fraction([0.5, 0.0, 0.0]))
        .unwrap();
    assert_eq!(slice.shape(), [shape[1], shape[2]]);
    assert!(geometry
        .fibre_slice(SliceSelector::Index([1, 1, 0]))
        .is_none());

    let profile = geometry.porosity_profile();
    assert_eq!(profile.x.len(), shape[0]);
    assert_eq!(profile.z.len(), shape[2]);
    assert!(profile.x.iter().all(|&p| (0.0..=1.0).contains(&p)));
}
