use gdp_scatter::config::AppConfig;
use gdp_scatter::join::working_set;
use gdp_scatter::plot::Session;
use gdp_scatter::render::Scales;
use gdp_scatter::scale::Rgb;
use gdp_scatter::svg::to_svg;
use std::fs;
use std::path::Path;

const POPULATION: &str = "\
Country Name,Country Code,2008,2009,2010
Aland,AAA,1000,1100,1200
Bland,BBB,5000,5100,5200
Cland,CCC,9000,,9200
";

const GDP: &str = "\
Country Name,Country Code,2008,2009,2010
Aland,AAA,10,11,12
Bland,BBB,50,51,52
";

const FERTILITY: &str = "\
Country Name,Country Code,2008,2009,2010
Aland,AAA,1.5,1.6,1.7
Bland,BBB,2.5,2.6,2.7
Cland,CCC,3.5,3.6,3.7
";

const UNEMPLOYMENT: &str = "\
Country Name,Country Code,2008,2009,2010
Aland,AAA,4,5,6
Bland,BBB,8,9,10
Cland,CCC,n/a,1,2
";

fn write_inputs(dir: &Path) -> AppConfig {
    for (name, body) in [
        ("population.csv", POPULATION),
        ("gdp.csv", GDP),
        ("fertility.csv", FERTILITY),
        ("unemployment.csv", UNEMPLOYMENT),
    ] {
        fs::write(dir.join(name), body).unwrap();
    }
    let config = format!(
        "[input]\npopulation = {:?}\ngdp = {:?}\nfertility_rate = {:?}\nunemployment = {:?}\n\
         [years]\nmin = 2008\nmax = 2010\n",
        dir.join("population.csv"),
        dir.join("gdp.csv"),
        dir.join("fertility.csv"),
        dir.join("unemployment.csv"),
    );
    let path = dir.join("config.toml");
    fs::write(&path, config).unwrap();
    AppConfig::load_from_file(&path).unwrap()
}

#[test]
fn year_selection_redraws_the_plot() {
    let tmp = tempfile::tempdir().unwrap();
    let config = write_inputs(tmp.path());
    let mut session = Session::load(&config).unwrap();

    {
        let plot = session.plot.lock().unwrap();
        assert_eq!(plot.dataset.len(), 9);
        assert_eq!(plot.state.title, "Gdp over population in 2008");
    }

    session.control.input(2010.0);
    assert_eq!(session.control.input(2008.0), 2008);

    let mut plot = session.plot.lock().unwrap();
    assert_eq!(plot.state.title, "Gdp over population in 2008");

    let transition = plot.state.layout.transition;
    plot.state.scene.advance(transition);
    assert!(!plot.state.scene.is_animating());

    let records = working_set(&plot.dataset, 2008);
    let scales = Scales::compute(&records, &plot.state.layout, (
        Rgb::parse("lightblue").unwrap(),
        Rgb::parse("darkblue").unwrap(),
    ));
    assert_eq!(plot.state.scene.marks().len(), 3);
    for record in &records {
        let mark = plot.state.scene.mark(&record.country_code).unwrap();
        let expected = scales.target(record);
        assert_eq!(mark.attrs.cx, expected.cx);
        assert_eq!(mark.attrs.r, expected.r);
        assert_eq!(mark.attrs.fill, expected.fill);
        if expected.cy.is_nan() {
            assert!(mark.attrs.cy.is_nan());
        } else {
            assert_eq!(mark.attrs.cy, expected.cy);
        }
    }

    // CCC has no GDP row: it stays on the plot at a degenerate y
    let ccc = plot.state.scene.mark("CCC").unwrap();
    assert!(ccc.datum.gdp.is_nan());
    assert!(ccc.datum.unemployment.is_nan());
    assert_eq!(ccc.attrs.cx, 710.0);

    let svg = to_svg(&plot.state);
    assert!(svg.contains(">Gdp over population in 2008</text>"));
    assert!(svg.contains(r#"data-key="CCC" cx="710" cy="NaN""#));
}

#[test]
fn missing_input_file_aborts_startup() {
    let tmp = tempfile::tempdir().unwrap();
    let config = write_inputs(tmp.path());
    fs::remove_file(tmp.path().join("gdp.csv")).unwrap();

    let err = Session::load(&config).err().unwrap();
    assert!(format!("{:#}", err).contains("gdp.csv"));
}

#[test]
fn marks_keep_identity_across_years() {
    let tmp = tempfile::tempdir().unwrap();
    let config = write_inputs(tmp.path());
    let mut session = Session::load(&config).unwrap();

    let before: Vec<(String, u64)> = {
        let plot = session.plot.lock().unwrap();
        plot.state.scene.marks().iter().map(|m| (m.key.clone(), m.id)).collect()
    };

    session.control.input(2009.0);
    let plot = session.plot.lock().unwrap();
    let after: Vec<(String, u64)> = plot.state.scene.marks().iter().map(|m| (m.key.clone(), m.id)).collect();
    assert_eq!(before, after);
    assert!(plot.state.scene.marks().iter().all(|m| m.transition.is_some()));
}
