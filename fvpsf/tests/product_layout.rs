//! End-to-end layout checks for products built from the analytic SCAO model.

use approx::assert_relative_eq;
use fvpsf::field::{field_positions, SamplePoint};
use fvpsf::product::{
    build_scao_product, wave_extension_keyword, Hdu, ProductError, ProductMetadata,
    FIRST_DATA_EXTENSION,
};
use fvpsf::psf::{AnalyticScaoPsf, PsfConfig, PsfModel};

fn small_config() -> PsfConfig {
    PsfConfig {
        kernel_size: 32,
        ..Default::default()
    }
}

#[test]
fn two_samples_one_wavelength() {
    let samples = [SamplePoint::new(0.0, 0.0), SamplePoint::new(1.0, 2.0)];
    let product =
        build_scao_product(&samples, &[2.15], &ProductMetadata::default(), &small_config())
            .unwrap();

    assert_eq!(product.num_hdus(), 3);
    let primary = product.primary();
    assert_eq!(primary.get_int("ECAT"), Some(1));
    assert_eq!(primary.get_int("EDATA"), Some(2));
    assert_eq!(primary.get_float("WAVEEXT2"), Some(2.15));

    let catalog = product.catalog();
    assert_eq!(catalog.len(), 2);
    assert_eq!(catalog.layer, vec![0, 1]);
    assert_eq!(catalog.x, vec![0.0, 1.0]);
    assert_eq!(catalog.y, vec![0.0, 2.0]);

    assert_eq!(product.cubes()[0].data.dim(), (2, 32, 32));
}

#[test]
fn ring_product_layers_match_direct_evaluation() {
    let config = small_config();
    let samples = field_positions(&[1.0, 3.0, 5.0, 10.0], 60.0).unwrap();
    assert_eq!(samples.len(), 25);

    let waves = [1.0, 1.2, 1.6, 2.15];
    let product =
        build_scao_product(&samples, &waves, &ProductMetadata::default(), &config).unwrap();
    assert_eq!(product.num_hdus(), 2 + waves.len());
    assert!(matches!(product.hdu(0), Some(Hdu::Primary(_))));
    assert!(matches!(product.hdu(1), Some(Hdu::Catalog(_))));

    for (i, &wave) in waves.iter().enumerate() {
        let ext = FIRST_DATA_EXTENSION + i;
        assert_eq!(
            product.primary().get_float(&wave_extension_keyword(ext)),
            Some(wave)
        );

        let Some(Hdu::Cube(cube)) = product.hdu(ext) else {
            panic!("HDU {ext} should be a cube");
        };
        assert_eq!(cube.header.get_float("WAVE0"), Some(wave));
        assert_eq!(cube.num_layers(), samples.len());

        let psf = AnalyticScaoPsf::new(config.with_wavelength(wave)).unwrap();
        for j in [0, 7, 24] {
            let expected = psf.evaluate(samples[j]);
            let layer = cube.layer(j).unwrap();
            for (a, b) in layer.iter().zip(expected.iter()) {
                assert_relative_eq!(*a, *b, epsilon = 1e-15);
            }
        }
    }
}

#[test]
fn every_hdu_header_is_reachable() {
    let product = build_scao_product(
        &[SamplePoint::ON_AXIS],
        &[1.6, 2.15],
        &ProductMetadata::default(),
        &small_config(),
    )
    .unwrap();

    let extnames: Vec<Option<&str>> = product
        .hdus()
        .map(|hdu| hdu.header().get_str("EXTNAME"))
        .collect();
    assert_eq!(
        extnames,
        vec![None, Some("CATALOG"), Some("PSF_EXT2"), Some("PSF_EXT3")]
    );
}

#[test]
fn invalid_model_parameters_abort_the_build() {
    let config = PsfConfig {
        pixel_scale_arcsec: 0.0,
        ..small_config()
    };
    let result = build_scao_product(
        &[SamplePoint::ON_AXIS],
        &[2.15],
        &ProductMetadata::default(),
        &config,
    );
    assert!(matches!(result, Err(ProductError::Psf(_))));
}
